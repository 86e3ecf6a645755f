// 駆動される側アダプター（ストア・リポジトリ実装など）

mod booking_repository;
mod clock;
mod console_logger;
mod event_publisher;
mod inventory_store;
mod memory;
mod pricing;

pub use booking_repository::MySqlBookingRepository;
pub use clock::{FixedClock, SystemClock};
pub use console_logger::ConsoleLogger;
pub use event_publisher::ConsoleEventPublisher;
pub use inventory_store::MySqlInventoryStore;
pub use memory::{InMemoryBookingRepository, InMemoryEventPublisher, InMemoryInventoryStore};
pub use pricing::FlatRatePricingProvider;
