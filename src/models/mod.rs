//! Shared data model for gateway orchestration and routing

mod gateway;

pub use gateway::{
    endpoint_api_id, endpoint_for, ProvisionOutcome, RegionTeardown, RestApiPage, RestApiSummary,
    FORWARDED_FOR_HEADER, GATEWAY_DOMAIN, SPOOF_HEADER, STAGE_NAME,
};
