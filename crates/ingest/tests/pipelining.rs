use http::StatusCode;
use indoc::indoc;
use micro_ingest::codec::{Cursor, RequestParser, Scan, extract, tokenize};
use micro_ingest::config::{ExcessBody, ParserConfig};
use micro_ingest::protocol::{ParseError, QuickHeader, RequestChain, RequestState, Status};

fn crlf(str: &str) -> Vec<u8> {
    str.replace('\n', "\r\n").into_bytes()
}

#[test]
fn browser_session() {
    let buf = crlf(indoc! {r"
    GET / HTTP/1.1
    Host: localhost:2001
    User-Agent: Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/119.0
    Accept: text/html,application/xhtml+xml
    Accept-Encoding: gzip, deflate, br
    Connection: keep-alive

    GET /style.css HTTP/1.1
    Host: localhost:2001
    If-Modified-Since: Sat, 29 Oct 1994 19:43:31 GMT
    Range: bytes=0-1023

    POST /login HTTP/1.1
    Host: localhost:2001
    Content-Type: application/x-www-form-urlencoded
    Content-Length: 19

    user=admin&pass=abc"});

    let chain = RequestParser::new().parse(&buf).unwrap();
    assert_eq!(chain.status(), Status::Complete);
    assert_eq!(chain.consumed(), buf.len());
    assert_eq!(chain.len(), 3);

    let index = chain.first().unwrap();
    assert_eq!(index.quick(QuickHeader::AcceptEncoding).map(|view| view.slice(&buf)), Some(&b"gzip, deflate, br"[..]));
    assert_eq!(index.header(&buf, "connection"), Some(&b"keep-alive"[..]));

    let css = chain.next_of(0).unwrap();
    assert_eq!(css.decoded_path(&buf), b"/style.css");
    assert_eq!(css.header(&buf, "If-Modified-Since"), Some(&b"Sat, 29 Oct 1994 19:43:31 GMT"[..]));
    assert_eq!(css.quick(QuickHeader::Range).map(|view| view.slice(&buf)), Some(&b"bytes=0-1023"[..]));

    let login = chain.last().unwrap();
    assert_eq!(login.http_method(&buf), Some(http::Method::POST));
    assert_eq!(login.body_bytes(&buf), b"user=admin&pass=abc");
    assert_eq!(login.header(&buf, "content-type"), Some(&b"application/x-www-form-urlencoded"[..]));

    assert!(chain.iter().all(|record| record.state() == RequestState::HeaderPhase));
}

#[test]
fn request_arriving_byte_by_byte() {
    let full = crlf(indoc! {r"
    PUT /doc HTTP/1.1
    Host: example.com
    Content-Length: 4

    abcdGET /next HTTP/1.1
    Host: example.com

    "});
    let parser = RequestParser::new();
    let mut chain = RequestChain::new();
    let first_end = full.windows(4).position(|w| w == b"abcd").unwrap() + 4;

    for end in 0..full.len() {
        let status = parser.parse_into(&full[..end], &mut chain).unwrap();
        let expected = if end == first_end { Status::Complete } else { Status::Partial };
        assert_eq!(status, expected, "at {end}");
        assert_eq!(chain.len(), usize::from(end >= first_end), "at {end}");
        assert_eq!(chain.consumed(), if end >= first_end { first_end } else { 0 }, "at {end}");
    }

    assert_eq!(parser.parse_into(&full, &mut chain).unwrap(), Status::Complete);
    assert_eq!(chain.len(), 2);
}

#[test]
fn tokenizer_resumes_with_cursor() {
    let full = b"GET /a?b=c HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let mut cursor = Cursor::new();

    assert_eq!(tokenize(&mut cursor, &full[..10]).unwrap(), Scan::Partial);
    assert_eq!(tokenize(&mut cursor, &full[..30]).unwrap(), Scan::Partial);
    assert_eq!(tokenize(&mut cursor, full).unwrap(), Scan::Complete);
    assert_eq!(cursor.position(), full.len());
}

#[test]
fn missing_space_before_protocol() {
    // the tokenizer keeps waiting for the space, the line extractor gives up at the LF
    let buf = b"GET /HTTP/1.0\r\n\r\n";
    assert_eq!(tokenize(&mut Cursor::new(), buf).unwrap(), Scan::Partial);
    assert!(matches!(extract(buf, 0), Err(ParseError::Malformed { .. })));

    let chain = RequestParser::new().parse(buf).unwrap();
    assert_eq!(chain.status(), Status::Aborted(StatusCode::BAD_REQUEST));
}

#[test]
fn excess_body_policies() {
    let buf = b"POST / HTTP/1.0\r\nContent-Length: 2\r\n\r\nokGET / HTTP/1.0\r\n\r\n";

    let pipelined = RequestParser::new().parse(buf).unwrap();
    assert_eq!(pipelined.status(), Status::Complete);
    assert_eq!(pipelined.len(), 2);

    let strict = RequestParser::with_config(ParserConfig::default().with_excess_body(ExcessBody::Reject));
    let rejected = strict.parse(buf).unwrap();
    assert_eq!(rejected.status(), Status::Aborted(StatusCode::BAD_REQUEST));
    assert_eq!(rejected.len(), 1);
}

#[test]
fn smuggling_attempts_are_refused() {
    let parser = RequestParser::new();

    let te = crlf(indoc! {r"
    POST / HTTP/1.1
    Host: a
    Content-Length: 4
    Transfer-Encoding: chunked

    0

    "});
    let chain = parser.parse(&te).unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.first().unwrap().status(), Some(StatusCode::NOT_IMPLEMENTED));
    assert_eq!(chain.consumed(), te.len());

    let cl_cl = b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: 0\r\nContent-Length: 5\r\n\r\nGET /admin HTTP/1.1\r\nHost: a\r\n\r\n";
    let chain = parser.parse(cl_cl).unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.first().unwrap().status(), Some(StatusCode::BAD_REQUEST));
}

#[test]
fn record_lookups_match_headers() {
    let buf = b"GET /x HTTP/1.0\r\nhOsT: example.com\r\nX-Empty:\r\n\r\n";
    let chain = RequestParser::new().parse(buf).unwrap();

    // an empty header value is malformed for the tokenizer
    assert_eq!(chain.status(), Status::Aborted(StatusCode::BAD_REQUEST));

    let buf = b"GET /x HTTP/1.0\r\nhOsT: example.com\r\nX-Some: value\r\n\r\n";
    let chain = RequestParser::new().parse(buf).unwrap();
    let record = chain.first().unwrap();
    assert_eq!(record.header(buf, "Host"), Some(&b"example.com"[..]));
    assert_eq!(record.header(buf, "x-some"), Some(&b"value"[..]));
    assert_eq!(record.header(buf, "X-Missing"), None);
}
