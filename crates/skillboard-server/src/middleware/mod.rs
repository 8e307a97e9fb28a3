mod logging;

pub use logging::{dump_request, log_requests, ACCESS_TARGET, DUMP_TARGET, MAX_BODY_BYTES};
