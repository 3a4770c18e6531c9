//! Backend trait definition.

use crate::types::DataRequest;

/// Trait for the remote data source.
///
/// Requests are fire-and-forget. The backend answers every request exactly
/// once, later, with a [`DataResponse`](crate::types::DataResponse) carrying
/// the same range and resolution. Responses to requests at different
/// resolutions may arrive in any order.
pub trait Backend {
    /// Issue a fetch for `request.start..request.end` at `request.resolution`.
    fn request_data(&mut self, request: DataRequest);

    /// Get the backend name.
    fn name(&self) -> &str;
}
