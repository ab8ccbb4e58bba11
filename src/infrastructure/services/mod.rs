//! Application services

mod key_value_facade;

pub use key_value_facade::{
    KeyValueFacade, ModifyOutcome, ReadOutcome, StoreReading, WriteReport, WriteStatus,
    NOT_FOUND, SERVICE_UNAVAILABLE,
};
