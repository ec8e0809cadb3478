//! Theater construction for the planning binaries.

pub mod scenarios;

pub use scenarios::{
    create_coastal_theater, create_mountain_theater, create_random_theater, Scenario,
};
