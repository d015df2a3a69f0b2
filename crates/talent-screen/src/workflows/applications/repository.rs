use super::domain::{Application, ApplicationId};
use crate::workflows::store::RepositoryError;

/// Storage abstraction for application records. Saves overwrite the stored record.
pub trait ApplicationStore: Send + Sync {
    fn load_application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn save_application(&self, application: Application) -> Result<(), RepositoryError>;
}
