use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{GeocodeResponse, GeolocationError, GeolocationResult};
use crate::event::{Coordinate, Place};

pub const NO_ADDRESS_FOUND: &str = "No address found.";
pub const GEOCODE_TIMED_OUT: &str = "Address lookup timed out.";
pub const GEOCODE_STATUS_OK: &str = "OK";
pub const GEOCODE_STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// What the geocoding service told us about a coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeOutcome {
    Found(String),
    NotFound,
    Failed(String),
}

impl GeocodeOutcome {
    pub fn display_text(&self) -> String {
        match self {
            Self::Found(address) => address.clone(),
            Self::NotFound => NO_ADDRESS_FOUND.to_string(),
            Self::Failed(status) => format!("Geocoder failed: {status}"),
        }
    }
}

#[must_use]
pub fn interpret_geocode(response: &GeocodeResponse) -> GeocodeOutcome {
    match response.status.as_str() {
        GEOCODE_STATUS_OK => response
            .results
            .first()
            .map_or(GeocodeOutcome::NotFound, |r| {
                GeocodeOutcome::Found(r.formatted_address.clone())
            }),
        GEOCODE_STATUS_ZERO_RESULTS => GeocodeOutcome::NotFound,
        other => GeocodeOutcome::Failed(other.to_string()),
    }
}

/// The first place's coordinate. The autocomplete widget's ordering is
/// taken as authoritative; there is no disambiguation between candidates.
#[must_use]
pub fn first_place_coordinate(places: &[Place]) -> Option<Coordinate> {
    let place = places.first()?;
    if place.location.is_none() {
        warn!(name = ?place.name, "Selected place has no geometry");
    }
    place.location
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolutionStatus {
    #[default]
    Idle,
    Resolving,
    Resolved,
    NotFound,
    Failed {
        status: String,
    },
    TimedOut,
}

impl ResolutionStatus {
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::TimedOut)
    }
}

impl From<&GeocodeOutcome> for ResolutionStatus {
    fn from(outcome: &GeocodeOutcome) -> Self {
        match outcome {
            GeocodeOutcome::Found(_) => Self::Resolved,
            GeocodeOutcome::NotFound => Self::NotFound,
            GeocodeOutcome::Failed(status) => Self::Failed {
                status: status.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub seq: u64,
    pub started_at_ms: u64,
    pub timeout_ms: u64,
}

impl PendingRequest {
    #[must_use]
    pub const fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_at_ms) >= self.timeout_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionOutcome {
    /// Response to a request that was superseded or already timed out.
    Stale,
    Located(Coordinate),
    Failed(GeolocationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Expired {
    pub position: bool,
    pub geocode: bool,
}

impl Expired {
    #[must_use]
    pub const fn any(self) -> bool {
        self.position || self.geocode
    }
}

/// Tracks in-flight position and geocode requests. Every request gets a
/// fresh sequence number; only the latest one of each kind is accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationResolver {
    next_seq: u64,
    position: Option<PendingRequest>,
    geocode: Option<PendingRequest>,
    geocode_target: Option<Coordinate>,
    resolved_address: String,
    status: ResolutionStatus,
    denied: Option<GeolocationError>,
}

impl LocationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolved_address(&self) -> &str {
        &self.resolved_address
    }

    pub fn status(&self) -> &ResolutionStatus {
        &self.status
    }

    /// Sticky location failure, shown as a modal until dismissed or until a
    /// later fix succeeds.
    pub fn denied(&self) -> Option<GeolocationError> {
        self.denied
    }

    pub fn is_locating(&self) -> bool {
        self.position.is_some()
    }

    pub fn is_geocoding(&self) -> bool {
        self.geocode.is_some()
    }

    pub fn pending_position(&self) -> Option<&PendingRequest> {
        self.position.as_ref()
    }

    pub fn pending_geocode(&self) -> Option<&PendingRequest> {
        self.geocode.as_ref()
    }

    /// Coordinate to geocode again after a failed or timed-out lookup.
    pub fn retry_target(&self) -> Option<Coordinate> {
        if self.status.is_retryable() && self.geocode.is_none() {
            self.geocode_target
        } else {
            None
        }
    }

    fn issue(&mut self, now_ms: u64, timeout_ms: u64) -> PendingRequest {
        self.next_seq += 1;
        PendingRequest {
            seq: self.next_seq,
            started_at_ms: now_ms,
            timeout_ms,
        }
    }

    pub fn begin_position(&mut self, now_ms: u64, timeout_ms: u64) -> u64 {
        let request = self.issue(now_ms, timeout_ms);
        if let Some(previous) = self.position.replace(request) {
            debug!(superseded = previous.seq, seq = request.seq, "Position request superseded");
        }
        request.seq
    }

    pub fn accept_position(&mut self, seq: u64, result: &GeolocationResult) -> PositionOutcome {
        match self.position {
            Some(pending) if pending.seq == seq => {}
            _ => {
                debug!(seq, "Discarding stale position response");
                return PositionOutcome::Stale;
            }
        }
        self.position = None;

        match result {
            Ok(position) => {
                self.denied = None;
                info!(coordinate = %position.coordinate, "Current position resolved");
                PositionOutcome::Located(position.coordinate)
            }
            Err(error) => {
                warn!(%error, "Current position unavailable");
                self.denied = Some(*error);
                PositionOutcome::Failed(*error)
            }
        }
    }

    pub fn begin_geocode(&mut self, coordinate: Coordinate, now_ms: u64, timeout_ms: u64) -> u64 {
        let request = self.issue(now_ms, timeout_ms);
        if let Some(previous) = self.geocode.replace(request) {
            debug!(superseded = previous.seq, seq = request.seq, "Geocode request superseded");
        }
        self.geocode_target = Some(coordinate);
        self.status = ResolutionStatus::Resolving;
        request.seq
    }

    /// Applies a geocoder reply. Returns `None` when the reply is stale.
    pub fn accept_geocode(&mut self, seq: u64, response: &GeocodeResponse) -> Option<GeocodeOutcome> {
        match self.geocode {
            Some(pending) if pending.seq == seq => {}
            _ => {
                debug!(seq, status = %response.status, "Discarding stale geocode response");
                return None;
            }
        }
        self.geocode = None;

        let outcome = interpret_geocode(response);
        if let GeocodeOutcome::Failed(status) = &outcome {
            warn!(%status, "Reverse geocoding failed");
        }
        self.resolved_address = outcome.display_text();
        self.status = ResolutionStatus::from(&outcome);
        Some(outcome)
    }

    /// Times out requests older than their budget. Late replies to expired
    /// requests are then discarded as stale.
    pub fn expire(&mut self, now_ms: u64) -> Expired {
        let mut expired = Expired::default();

        if self.position.is_some_and(|p| p.is_expired(now_ms)) {
            self.position = None;
            self.denied = Some(GeolocationError::Timeout);
            expired.position = true;
            warn!("Position request timed out");
        }

        if self.geocode.is_some_and(|g| g.is_expired(now_ms)) {
            self.geocode = None;
            self.resolved_address = GEOCODE_TIMED_OUT.to_string();
            self.status = ResolutionStatus::TimedOut;
            expired.geocode = true;
            warn!("Geocode request timed out");
        }

        expired
    }

    pub fn dismiss_denied(&mut self) {
        self.denied = None;
    }

    /// Drops the pending position request once the user has placed the
    /// marker some other way. Its reply, or its timeout, then changes nothing.
    pub fn supersede_position(&mut self) -> bool {
        match self.position.take() {
            Some(pending) => {
                debug!(seq = pending.seq, "Position request superseded by user choice");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Position;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn fix(lat: f64, lng: f64) -> GeolocationResult {
        Ok(Position {
            coordinate: coord(lat, lng),
            accuracy_m: None,
        })
    }

    #[test]
    fn test_interpret_ok_uses_first_result() {
        let outcome = interpret_geocode(&GeocodeResponse::ok("221B Baker St"));
        assert_eq!(outcome, GeocodeOutcome::Found("221B Baker St".into()));
        assert_eq!(outcome.display_text(), "221B Baker St");
    }

    #[test]
    fn test_interpret_zero_results() {
        let outcome = interpret_geocode(&GeocodeResponse::failed("ZERO_RESULTS"));
        assert_eq!(outcome.display_text(), "No address found.");
    }

    #[test]
    fn test_interpret_ok_without_results() {
        let outcome = interpret_geocode(&GeocodeResponse::failed("OK"));
        assert_eq!(outcome, GeocodeOutcome::NotFound);
    }

    #[test]
    fn test_interpret_other_status() {
        let outcome = interpret_geocode(&GeocodeResponse::failed("X"));
        assert_eq!(outcome.display_text(), "Geocoder failed: X");
        assert_eq!(
            ResolutionStatus::from(&outcome),
            ResolutionStatus::Failed { status: "X".into() }
        );
    }

    #[test]
    fn test_first_place_wins() {
        let places = vec![
            Place {
                location: Some(coord(1.0, 2.0)),
                ..Place::default()
            },
            Place {
                location: Some(coord(3.0, 4.0)),
                ..Place::default()
            },
        ];
        assert_eq!(first_place_coordinate(&places), Some(coord(1.0, 2.0)));
        assert_eq!(first_place_coordinate(&[]), None);
        assert_eq!(first_place_coordinate(&[Place::default()]), None);
    }

    #[test]
    fn test_position_success_clears_denied_flag() {
        let mut resolver = LocationResolver::new();
        let seq = resolver.begin_position(0, 1_000);
        resolver.accept_position(seq, &Err(GeolocationError::PermissionDenied));
        assert_eq!(resolver.denied(), Some(GeolocationError::PermissionDenied));

        let seq = resolver.begin_position(10, 1_000);
        assert!(resolver.is_locating());
        let outcome = resolver.accept_position(seq, &fix(5.0, 6.0));
        assert_eq!(outcome, PositionOutcome::Located(coord(5.0, 6.0)));
        assert_eq!(resolver.denied(), None);
        assert!(!resolver.is_locating());
    }

    #[test]
    fn test_superseded_position_response_is_stale() {
        let mut resolver = LocationResolver::new();
        let first = resolver.begin_position(0, 1_000);
        let second = resolver.begin_position(5, 1_000);
        assert_ne!(first, second);

        assert_eq!(resolver.accept_position(first, &fix(1.0, 1.0)), PositionOutcome::Stale);
        assert!(resolver.is_locating());
        assert_eq!(
            resolver.accept_position(second, &fix(2.0, 2.0)),
            PositionOutcome::Located(coord(2.0, 2.0))
        );
    }

    #[test]
    fn test_last_geocode_request_wins() {
        let mut resolver = LocationResolver::new();
        let old = resolver.begin_geocode(coord(1.0, 1.0), 0, 1_000);
        let new = resolver.begin_geocode(coord(2.0, 2.0), 1, 1_000);

        let applied = resolver.accept_geocode(new, &GeocodeResponse::ok("New Place"));
        assert_eq!(applied, Some(GeocodeOutcome::Found("New Place".into())));

        assert_eq!(resolver.accept_geocode(old, &GeocodeResponse::ok("Old Place")), None);
        assert_eq!(resolver.resolved_address(), "New Place");
        assert_eq!(resolver.status(), &ResolutionStatus::Resolved);
    }

    #[test]
    fn test_geocode_timeout_then_late_reply_is_ignored() {
        let mut resolver = LocationResolver::new();
        let seq = resolver.begin_geocode(coord(1.0, 1.0), 100, 1_000);

        assert!(!resolver.expire(1_099).any());
        let expired = resolver.expire(1_100);
        assert!(expired.geocode);
        assert!(!expired.position);
        assert_eq!(resolver.resolved_address(), GEOCODE_TIMED_OUT);
        assert_eq!(resolver.status(), &ResolutionStatus::TimedOut);
        assert_eq!(resolver.retry_target(), Some(coord(1.0, 1.0)));

        assert_eq!(resolver.accept_geocode(seq, &GeocodeResponse::ok("Late")), None);
        assert_eq!(resolver.resolved_address(), GEOCODE_TIMED_OUT);
    }

    #[test]
    fn test_position_timeout_sets_denied() {
        let mut resolver = LocationResolver::new();
        let seq = resolver.begin_position(0, 500);
        assert!(resolver.expire(500).position);
        assert_eq!(resolver.denied(), Some(GeolocationError::Timeout));
        assert_eq!(resolver.accept_position(seq, &fix(1.0, 1.0)), PositionOutcome::Stale);

        resolver.dismiss_denied();
        assert_eq!(resolver.denied(), None);
    }

    #[test]
    fn test_supersede_position_drops_reply_and_timeout() {
        let mut resolver = LocationResolver::new();
        let seq = resolver.begin_position(0, 500);

        assert!(resolver.supersede_position());
        assert!(!resolver.is_locating());
        assert!(!resolver.supersede_position());

        assert!(!resolver.expire(10_000).any());
        assert_eq!(resolver.denied(), None);
        assert_eq!(resolver.accept_position(seq, &fix(1.0, 1.0)), PositionOutcome::Stale);
    }

    #[test]
    fn test_retry_target_only_after_failure() {
        let mut resolver = LocationResolver::new();
        assert_eq!(resolver.retry_target(), None);

        let seq = resolver.begin_geocode(coord(1.0, 1.0), 0, 1_000);
        assert_eq!(resolver.retry_target(), None);

        resolver.accept_geocode(seq, &GeocodeResponse::ok("Somewhere"));
        assert_eq!(resolver.retry_target(), None);

        let seq = resolver.begin_geocode(coord(1.0, 1.0), 0, 1_000);
        resolver.accept_geocode(seq, &GeocodeResponse::failed("OVER_QUERY_LIMIT"));
        assert_eq!(resolver.retry_target(), Some(coord(1.0, 1.0)));
    }
}
