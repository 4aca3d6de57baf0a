pub mod dto;
pub mod file_history_repository;
pub mod image_file;
pub mod memory_history_repository;
pub mod paths;
pub mod secret_service;
pub mod settings_service;
pub mod storage;

pub use crate::file_history_repository::FileHistoryRepository;
pub use crate::image_file::load_image_file;
pub use crate::memory_history_repository::InMemoryHistoryRepository;
pub use crate::paths::AgroPaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::settings_service::SettingsService;
