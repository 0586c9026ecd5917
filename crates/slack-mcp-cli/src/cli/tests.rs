use super::*;
use serve::resolve_auth_token;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn defaults_to_stdio_on_port_3000() {
    let cli = parse(&["slack-mcp"]);
    assert_eq!(cli.transport, Transport::Stdio);
    assert_eq!(cli.port, 3000);
}

#[test]
fn http_with_port_and_token() {
    let cli = parse(&["slack-mcp", "--transport", "http", "--port", "8080", "--token", "abc"]);
    assert_eq!(cli.transport, Transport::Http);
    assert_eq!(cli.port, 8080);
    assert_eq!(cli.token.as_deref(), Some("abc"));
}

#[test]
fn unknown_transport_is_rejected() {
    assert!(Cli::try_parse_from(["slack-mcp", "--transport", "sse"]).is_err());
}

#[test]
fn port_zero_and_overflow_are_rejected() {
    assert!(Cli::try_parse_from(["slack-mcp", "--port", "0"]).is_err());
    assert!(Cli::try_parse_from(["slack-mcp", "--port", "65536"]).is_err());
    assert!(Cli::try_parse_from(["slack-mcp", "--port", "abc"]).is_err());
}

#[test]
fn provided_token_is_kept() {
    assert_eq!(resolve_auth_token(Some("mytoken".into())), "mytoken");
}

#[test]
fn missing_token_is_generated() {
    let a = resolve_auth_token(None);
    let b = resolve_auth_token(Some(String::new()));
    assert_eq!(a.len(), 36);
    assert_ne!(a, b);
}
