use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::middleware::StateInformationMiddleware;
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::PeerIpKeyExtractor,
	GovernorError,
};

pub type PeerLimit = GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// How often stale per-peer rate limiting state is dropped.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Builds a per-peer-IP rate limit allowing `per_second` sustained requests,
/// returning [`None`] if the limits are zero.
///
/// Requires the service to be run with connect info, so the peer address
/// is available to the key extractor.
pub fn per_peer(per_second: u64, burst_size: u32) -> Option<Arc<PeerLimit>> {
	if per_second == 0 {
		return None;
	}

	// the builder takes the time it takes to replenish a single request
	let config = Arc::new(
		GovernorConfigBuilder::default()
			.per_nanosecond(NANOS_PER_SECOND / per_second)
			.burst_size(burst_size)
			.use_headers()
			.error_handler(error_handler)
			.finish()?,
	);

	cleanup_old_limits(&config);

	Some(config)
}

fn error_handler(error: GovernorError) -> Response<Body> {
	crate::error::Error::from(error).into_response()
}

/// Periodically drops rate limiting state for peers that have not been
/// seen recently, so the storage does not grow forever.
fn cleanup_old_limits(config: &Arc<PeerLimit>) {
	let limiter = config.limiter().clone();

	tokio::spawn(async move {
		let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

		loop {
			interval.tick().await;

			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}

#[cfg(test)]
mod test {
	use std::net::{IpAddr, Ipv4Addr};

	use super::*;

	#[test]
	fn test_zero_limits_are_disabled() {
		assert!(per_peer(0, 50).is_none());
		assert!(per_peer(10, 0).is_none());
	}

	#[tokio::test]
	async fn test_refills_at_configured_rate() {
		let config = per_peer(10, 50).unwrap();
		let limiter = config.limiter();
		let peer = IpAddr::V4(Ipv4Addr::LOCALHOST);

		let allowed = || {
			std::iter::from_fn(|| limiter.check_key(&peer).ok())
				.take(100)
				.count()
		};

		assert_eq!(allowed(), 50);

		tokio::time::sleep(Duration::from_millis(500)).await;

		// ten per second, so roughly five after half a second
		let refilled = allowed();

		assert!((4..50).contains(&refilled), "refilled {refilled}");
	}
}
