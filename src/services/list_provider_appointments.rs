use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{calendar_day, Appointment, OfficeHours};
use crate::error::AppResult;
use crate::repositories::AppointmentsRepository;
use crate::services::cache::{keys, recover_json, save_json, CacheProvider};

/// A provider's schedule for one day, read through the cache.
pub struct ListProviderAppointmentsService {
    appointments: Arc<dyn AppointmentsRepository>,
    cache: Arc<dyn CacheProvider>,
    office_hours: OfficeHours,
}

impl ListProviderAppointmentsService {
    pub fn new(
        appointments: Arc<dyn AppointmentsRepository>,
        cache: Arc<dyn CacheProvider>,
        office_hours: OfficeHours,
    ) -> Self {
        Self {
            appointments,
            cache,
            office_hours,
        }
    }

    pub async fn execute(
        &self,
        provider_id: Uuid,
        year: i32,
        month: u32,
        day: u32,
    ) -> AppResult<Vec<Appointment>> {
        let day = calendar_day(year, month, day)?;
        let key = keys::provider_appointments(provider_id, day);

        if let Some(cached) = recover_json::<Vec<Appointment>>(self.cache.as_ref(), &key).await {
            return Ok(cached);
        }

        let (from, to) = self.office_hours.day_bounds(day)?;
        let appointments = self
            .appointments
            .find_all_in_range_from_provider(provider_id, from, to)
            .await?;

        if let Err(e) = save_json(self.cache.as_ref(), &key, &appointments).await {
            tracing::warn!(key = %key, error = %e, "Failed to cache provider schedule");
        }

        Ok(appointments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::testing::{at, FakeAppointments, FakeCache};
    use chrono::NaiveDate;

    fn service() -> (Arc<FakeAppointments>, Arc<FakeCache>, ListProviderAppointmentsService) {
        let appointments = Arc::new(FakeAppointments::default());
        let cache = Arc::new(FakeCache::default());
        let service = ListProviderAppointmentsService::new(
            appointments.clone(),
            cache.clone(),
            OfficeHours::default(),
        );
        (appointments, cache, service)
    }

    #[tokio::test]
    async fn lists_only_the_requested_day_in_order() {
        let (appointments, _cache, service) = service();
        let provider = Uuid::new_v4();
        let user = Uuid::new_v4();
        appointments.insert(provider, user, at(2021, 5, 20, 15));
        appointments.insert(provider, user, at(2021, 5, 20, 9));
        appointments.insert(provider, user, at(2021, 5, 21, 9));
        appointments.insert(Uuid::new_v4(), user, at(2021, 5, 20, 10));

        let listed = service.execute(provider, 2021, 5, 20).await.unwrap();

        let hours: Vec<_> = listed.iter().map(|a| a.date).collect();
        assert_eq!(hours, vec![at(2021, 5, 20, 9), at(2021, 5, 20, 15)]);
    }

    #[tokio::test]
    async fn populates_the_cache_on_a_miss() {
        let (appointments, cache, service) = service();
        let provider = Uuid::new_v4();
        appointments.insert(provider, Uuid::new_v4(), at(2021, 5, 20, 9));

        service.execute(provider, 2021, 5, 20).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2021, 5, 20).unwrap();
        assert!(cache.contains(&keys::provider_appointments(provider, day)));
    }

    #[tokio::test]
    async fn serves_hits_without_the_repository() {
        let (appointments, _cache, service) = service();
        let provider = Uuid::new_v4();
        appointments.insert(provider, Uuid::new_v4(), at(2021, 5, 20, 9));

        let first = service.execute(provider, 2021, 5, 20).await.unwrap();
        // Not visible until the cached day is invalidated
        appointments.insert(provider, Uuid::new_v4(), at(2021, 5, 20, 10));
        let second = service.execute(provider, 2021, 5, 20).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn rejects_impossible_days() {
        let (_appointments, _cache, service) = service();

        let result = service.execute(Uuid::new_v4(), 2021, 2, 30).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn rejects_the_last_representable_day() {
        let (_appointments, _cache, service) = service();

        let result = service.execute(Uuid::new_v4(), 262142, 12, 31).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
