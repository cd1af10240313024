//! Abstraction over where arrivals come from.

use std::future::Future;

use super::client::ArrivalsClient;
use super::error::ArrivalsError;
use super::types::ArrivalsResponse;

/// Something that can answer "what is arriving at this stop?".
///
/// The aggregator is written against this trait so it can be driven by the
/// real proxy client or by [`super::mock::MockArrivalsSource`].
pub trait ArrivalsSource: Send + Sync {
    fn fetch_arrivals(
        &self,
        stop_code: &str,
    ) -> impl Future<Output = Result<ArrivalsResponse, ArrivalsError>> + Send;
}

impl ArrivalsSource for ArrivalsClient {
    fn fetch_arrivals(
        &self,
        stop_code: &str,
    ) -> impl Future<Output = Result<ArrivalsResponse, ArrivalsError>> + Send {
        ArrivalsClient::fetch_arrivals(self, stop_code)
    }
}
