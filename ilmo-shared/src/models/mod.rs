/// Database models and their queries
///
/// - `place`: venues
/// - `payment`: payment details shared by paid events
/// - `event`: events with their registration form specification
/// - `attendee`: registrations
///
/// # Example
///
/// ```no_run
/// use ilmo_shared::models::place::{CreatePlace, Place};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let place = Place::create(&pool, CreatePlace {
///     name: "Kiltahuone".to_string(),
///     address: "Otakaari 1, Espoo".to_string(),
///     description: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod attendee;
pub mod event;
pub mod payment;
pub mod place;
