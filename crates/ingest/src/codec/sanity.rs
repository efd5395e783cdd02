//! Semantic checks on structurally valid requests.
//!
//! [`validate`] runs after a request has been split off the buffer. It never fails the
//! parse: a refused request keeps its place in the chain and carries the status code of
//! the error response in [`RequestRecord::status`].

use std::sync::Arc;

use http::Version;
use tracing::{debug, trace};

use crate::codec::header::content_length;
use crate::config::ParserConfig;
use crate::ensure;
use crate::protocol::{HostResolver, QuickHeader, Rejection, RequestRecord, RequestState};
use crate::utils::{find_byte, has_dot_dot};

/// Methods whose body is framed by `Content-Length`
const BODY_METHODS: [&[u8]; 2] = [b"POST", b"PUT"];

/// Longest valid port, compared as text against equally long ports
const MAX_PORT: &[u8] = b"65535";

/// Returns true if requests with this method carry a `Content-Length` framed body.
pub(crate) fn has_body(method: &[u8]) -> bool {
    BODY_METHODS.contains(&method)
}

/// Checks a parsed request, in order: path traversal, `Host`, `Transfer-Encoding`, then
/// the `Content-Length` framing of POST and PUT bodies.
///
/// On success the record moves to [`RequestState::HeaderPhase`]. On rejection its status
/// is set to the matching error code and its state is left untouched.
///
/// When a `resolver` is given and the record has no virtual host yet, the `Host` value
/// without its port is resolved and the result is kept as a weak reference.
///
/// # Errors
///
/// Returns the first [`Rejection`] found.
pub fn validate(
    record: &mut RequestRecord,
    buf: &[u8],
    config: &ParserConfig,
    resolver: Option<&dyn HostResolver>,
) -> Result<(), Rejection> {
    match check(record, buf, config, resolver) {
        Ok(()) => {
            record.state = RequestState::HeaderPhase;
            trace!(uri = ?record.line.uri, "request accepted");
            Ok(())
        }
        Err(rejection) => {
            let status = rejection.status_code();
            debug!(uri = ?record.line.uri, %status, cause = %rejection, "request rejected");
            record.status = Some(status);
            Err(rejection)
        }
    }
}

fn check(record: &mut RequestRecord, buf: &[u8], config: &ParserConfig, resolver: Option<&dyn HostResolver>) -> Result<(), Rejection> {
    ensure!(!has_dot_dot(record.decoded_path(buf)), Rejection::PathTraversal);

    match record.quick(QuickHeader::Host) {
        Some(host) => {
            let name = host_name(host.slice(buf))?;
            if let Some(resolver) = resolver
                && record.vhost.is_none()
            {
                record.vhost = resolver.resolve(name).as_ref().map(Arc::downgrade);
            }
        }
        None => ensure!(record.version(buf) != Some(Version::HTTP_11), Rejection::MissingHost),
    }

    ensure!(!record.headers.has_transfer_encoding(), Rejection::UnsupportedTransferEncoding);

    if has_body(record.method(buf)) {
        let value = record.quick(QuickHeader::ContentLength).ok_or(Rejection::LengthRequired)?;
        let declared = content_length(value.slice(buf)).ok_or(Rejection::InvalidContentLength)?;
        ensure!(!record.headers.has_conflicting_length(), Rejection::ConflictingContentLength);

        let max_size = config.max_request_size();
        ensure!(
            usize::try_from(declared).is_ok_and(|declared| declared <= max_size),
            Rejection::PayloadTooLarge { declared, max_size }
        );

        let actual = record.body.len();
        ensure!(u64::try_from(actual) == Ok(declared), Rejection::BodyLengthMismatch { declared, actual });
    }

    Ok(())
}

/// Checks the port of a `Host` value and returns the host name without it.
///
/// A bracketed IPv6 literal keeps its inner colons; the port is what follows `]:`.
fn host_name(host: &[u8]) -> Result<&[u8], Rejection> {
    let search_from = if host.first() == Some(&b'[') {
        find_byte(b']', host, 0, host.len()).ok_or(Rejection::InvalidHostPort { reason: "unterminated ipv6 literal" })?
    } else {
        0
    };

    let Some(colon) = find_byte(b':', host, search_from, host.len()) else {
        return Ok(host);
    };

    let port = &host[colon + 1..];
    ensure!(!port.is_empty(), Rejection::InvalidHostPort { reason: "empty port" });
    ensure!(port.len() <= MAX_PORT.len(), Rejection::InvalidHostPort { reason: "port too long" });
    ensure!(port.iter().all(u8::is_ascii_digit), Rejection::InvalidHostPort { reason: "port is not numeric" });
    ensure!(port.len() < MAX_PORT.len() || port <= MAX_PORT, Rejection::InvalidHostPort { reason: "port out of range" });

    Ok(&host[..colon])
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::codec::request_line::parse_head;
    use crate::protocol::{View, VirtualHost};

    /// Parses the head of `buf` and takes everything after it as the body.
    fn record(buf: &[u8]) -> RequestRecord {
        let (line, headers) = parse_head(buf, 0).unwrap();
        let body_start = headers.block().end() + 2;
        let mut record = RequestRecord::new(line, headers);
        record.body = View::between(body_start, buf.len());
        record
    }

    fn reject(buf: &[u8]) -> Rejection {
        let mut record = record(buf);
        let rejection = validate(&mut record, buf, &ParserConfig::default(), None).unwrap_err();
        assert_eq!(record.status(), Some(rejection.status_code()));
        assert_eq!(record.state(), RequestState::New);
        rejection
    }

    fn accept(buf: &[u8]) -> RequestRecord {
        let mut record = record(buf);
        validate(&mut record, buf, &ParserConfig::default(), None).unwrap();
        assert_eq!(record.state(), RequestState::HeaderPhase);
        assert_eq!(record.status(), None);
        record
    }

    #[derive(Debug)]
    struct Hosts(Vec<Arc<VirtualHost>>);

    impl HostResolver for Hosts {
        fn resolve(&self, host: &[u8]) -> Option<Arc<VirtualHost>> {
            self.0.iter().find(|vhost| vhost.name().as_bytes().eq_ignore_ascii_case(host)).cloned()
        }
    }

    #[test]
    fn path_traversal() {
        let rejection = reject(b"GET /../etc/passwd HTTP/1.0\r\n\r\n");
        assert_eq!(rejection, Rejection::PathTraversal);
        assert_eq!(rejection.status_code(), StatusCode::FORBIDDEN);

        // only the path is checked, not the query
        accept(b"GET /a?from=.. HTTP/1.0\r\n\r\n");
        accept(b"GET /a/./b HTTP/1.0\r\n\r\n");
    }

    #[test]
    fn host_ports() {
        accept(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
        accept(b"GET / HTTP/1.1\r\nHost: example.com:8080\r\n\r\n");
        accept(b"GET / HTTP/1.1\r\nHost: example.com:65535\r\n\r\n");
        accept(b"GET / HTTP/1.1\r\nHost: example.com:9\r\n\r\n");
        accept(b"GET / HTTP/1.1\r\nHost: [::1]:443\r\n\r\n");
        accept(b"GET / HTTP/1.1\r\nHost: [::1]\r\n\r\n");

        for host in ["example.com:65536", "example.com:99999", "example.com:123456", "example.com:80a", "example.com:", "a:1:2", "[::1"] {
            let buf = format!("GET / HTTP/1.1\r\nHost: {host}\r\n\r\n");
            let rejection = reject(buf.as_bytes());
            assert!(matches!(rejection, Rejection::InvalidHostPort { .. }), "{host} => {rejection:?}");
            assert_eq!(rejection.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn host_required_for_http_11() {
        assert_eq!(reject(b"GET / HTTP/1.1\r\n\r\n"), Rejection::MissingHost);
        accept(b"GET / HTTP/1.0\r\n\r\n");
    }

    #[test]
    fn transfer_encoding_not_implemented() {
        let rejection = reject(b"POST / HTTP/1.1\r\nHost: a\r\nTransfer-Encoding: chunked\r\nContent-Length: 0\r\n\r\n");
        assert_eq!(rejection, Rejection::UnsupportedTransferEncoding);
        assert_eq!(rejection.status_code(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn body_framing() {
        assert_eq!(reject(b"POST / HTTP/1.0\r\n\r\n"), Rejection::LengthRequired);
        assert_eq!(reject(b"PUT / HTTP/1.0\r\n\r\n").status_code(), StatusCode::LENGTH_REQUIRED);
        assert_eq!(reject(b"POST / HTTP/1.0\r\nContent-Length: ten\r\n\r\n"), Rejection::InvalidContentLength);
        assert_eq!(reject(b"POST / HTTP/1.0\r\nContent-Length: -1\r\n\r\n"), Rejection::InvalidContentLength);
        assert_eq!(
            reject(b"POST / HTTP/1.0\r\nContent-Length: 4\r\nContent-Length: 5\r\n\r\nabcd"),
            Rejection::ConflictingContentLength
        );
        assert_eq!(
            reject(b"POST / HTTP/1.0\r\nContent-Length: 4097\r\n\r\n"),
            Rejection::PayloadTooLarge { declared: 4097, max_size: 4096 }
        );
        assert_eq!(
            reject(b"POST / HTTP/1.0\r\nContent-Length: 10\r\n\r\n1234567"),
            Rejection::BodyLengthMismatch { declared: 10, actual: 7 }
        );

        let buf = b"POST /form HTTP/1.0\r\nContent-Length: 10\r\n\r\n1234567890";
        let record = accept(buf);
        assert_eq!(record.body_bytes(buf), b"1234567890");

        // other methods are not framed here
        accept(b"GET / HTTP/1.0\r\nContent-Length: nope\r\n\r\n");
    }

    #[test]
    fn checks_run_in_order() {
        // traversal wins over a missing host and a missing length
        assert_eq!(reject(b"POST /.. HTTP/1.1\r\n\r\n"), Rejection::PathTraversal);
        assert_eq!(reject(b"POST / HTTP/1.1\r\n\r\n"), Rejection::MissingHost);
    }

    #[test]
    fn resolves_virtual_host() {
        let hosts = Hosts(vec![Arc::new(VirtualHost::new("example.com")), Arc::new(VirtualHost::new("other.org"))]);
        let buf = b"GET / HTTP/1.1\r\nHost: OTHER.org:8080\r\n\r\n";
        let mut record = record(buf);

        validate(&mut record, buf, &ParserConfig::default(), Some(&hosts)).unwrap();
        assert_eq!(record.vhost().as_deref().map(VirtualHost::name), Some("other.org"));

        let buf = b"GET / HTTP/1.1\r\nHost: unknown.net\r\n\r\n";
        let mut record = self::record(buf);
        validate(&mut record, buf, &ParserConfig::default(), Some(&hosts)).unwrap();
        assert!(record.vhost().is_none());
    }

    #[test]
    fn body_methods() {
        assert!(has_body(b"POST"));
        assert!(has_body(b"PUT"));
        assert!(!has_body(b"post"));
        assert!(!has_body(b"PATCH"));
    }
}
