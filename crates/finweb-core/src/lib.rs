//! Core tracker functionality for finweb

pub mod alerts;
pub mod backup;
pub mod balances;
pub mod cloud;
pub mod error;
pub mod filter;
pub mod import;
pub mod models;
pub mod report;
pub mod store;
pub mod tracker;

pub use alerts::{AlertStatus, PaymentAlert};
pub use backup::Backup;
pub use balances::{AccountSummary, Balance, CashSummary, Totals};
pub use cloud::{CloudSnapshot, CloudStore, CloudStoreRef, CloudSync, HttpDocumentStore, MemoryCloudStore, SyncState, SyncStatus};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use filter::{MonthOption, MovementFilter};
pub use import::{ImportPreview, PreviewRow, RawMovementRow};
pub use models::{AccountDraft, BillingCycle, Card, CardType, Movement, MovementDraft, MovementKind, PaymentMethod, Theme};
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use tracker::{StoreRef, Tracker};
