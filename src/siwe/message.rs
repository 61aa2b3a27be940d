// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-4361 challenge text.
//!
//! Rendering and parsing are done by [`siwe::Message`]. The rendered text is
//! exactly what the wallet signs, so a challenge is only accepted in the
//! layout `siwe` renders:
//!
//! ```text
//! ${domain} wants you to sign in with your Ethereum account:
//! ${address}
//!
//! ${statement}
//!
//! URI: ${uri}
//! Version: 1
//! Chain ID: ${chain_id}
//! Nonce: ${nonce}
//! Issued At: ${issued_at}
//! Expiration Time: ${expiration_time}
//! ```

use std::str::FromStr;

use ::siwe::{Message, ParseError, TimeStamp, Version};
use alloy::primitives::Address;
use axum::http::uri::Authority;
use chrono::{DateTime, SecondsFormat, Utc};

/// Everything the service writes into a challenge.
#[derive(Debug, Clone)]
pub struct ChallengeFields<'a> {
    pub domain: &'a Authority,
    pub address: Address,
    /// `None` renders an empty statement line.
    pub statement: Option<&'a str>,
    pub uri: &'a str,
    pub chain_id: u64,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
}

/// Build a challenge and check that its rendering reads back unchanged.
pub fn compose(fields: ChallengeFields<'_>) -> Result<Message, ParseError> {
    let message = Message {
        domain: fields.domain.clone(),
        address: fields.address.into_array(),
        statement: fields.statement.map(str::to_string),
        uri: parse_field(fields.uri)?,
        version: Version::V1,
        chain_id: fields.chain_id,
        nonce: fields.nonce,
        issued_at: timestamp(fields.issued_at)?,
        expiration_time: Some(timestamp(fields.expiration_time)?),
        not_before: None,
        request_id: None,
        resources: Vec::new(),
    };

    if parse_canonical(&message.to_string())? != message {
        return Err(ParseError::Format("statement does not survive rendering"));
    }
    Ok(message)
}

/// Parse `text`, rejecting anything `siwe` would render differently.
pub fn parse_canonical(text: &str) -> Result<Message, ParseError> {
    let message = Message::from_str(text)?;
    if message.to_string() != text {
        return Err(ParseError::Format("message is not in canonical layout"));
    }
    Ok(message)
}

/// RFC 3986 authority: `[userinfo@]host[:port]`.
pub fn parse_domain(domain: &str) -> Result<Authority, ParseError> {
    Ok(Authority::from_str(domain)?)
}

/// Statements are a single line of printable text.
pub fn is_valid_statement(statement: &str) -> bool {
    !statement.chars().any(char::is_control)
}

/// EIP-55 checksummed signer address.
pub fn checksummed_address(message: &Message) -> String {
    ::siwe::eip55(&message.address)
}

fn parse_field<T>(value: &str) -> Result<T, ParseError>
where
    T: FromStr,
    ParseError: From<T::Err>,
{
    Ok(value.parse()?)
}

fn timestamp(at: DateTime<Utc>) -> Result<TimeStamp, ParseError> {
    Ok(at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .parse::<TimeStamp>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ADDRESS: &str = "0x32Be343B94f860124dC4fEe278FDCBD38C102D88";

    const SAMPLE_TEXT: &str = "example.com wants you to sign in with your Ethereum account:\n\
        0x32Be343B94f860124dC4fEe278FDCBD38C102D88\n\
        \n\
        Test statement\n\
        \n\
        URI: https://example.com/\n\
        Version: 1\n\
        Chain ID: 1\n\
        Nonce: testnonce1234\n\
        Issued At: 2024-01-01T01:00:00.000Z\n\
        Expiration Time: 2024-01-01T01:10:00.000Z";

    fn compose_sample(statement: Option<&str>) -> Result<Message, ParseError> {
        let domain = parse_domain("example.com").unwrap();
        compose(ChallengeFields {
            domain: &domain,
            address: Address::from_str(ADDRESS).unwrap(),
            statement,
            uri: "https://example.com/",
            chain_id: 1,
            nonce: "testnonce1234".to_string(),
            issued_at: Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap(),
            expiration_time: Utc.with_ymd_and_hms(2024, 1, 1, 1, 10, 0).unwrap(),
        })
    }

    #[test]
    fn renders_canonical_layout() {
        let message = compose_sample(Some("Test statement")).unwrap();
        assert_eq!(message.to_string(), SAMPLE_TEXT);
    }

    #[test]
    fn parses_canonical_layout() {
        let parsed = parse_canonical(SAMPLE_TEXT).unwrap();
        assert_eq!(parsed, compose_sample(Some("Test statement")).unwrap());
        assert_eq!(checksummed_address(&parsed), ADDRESS);
        assert_eq!(parsed.chain_id, 1);
        assert_eq!(parsed.nonce, "testnonce1234");
    }

    #[test]
    fn missing_statement_renders_empty_line() {
        let message = compose_sample(None).unwrap();
        let text = message.to_string();
        assert!(text.contains(&format!("{ADDRESS}\n\n\nURI: ")));
        assert_eq!(parse_canonical(&text).unwrap(), message);
    }

    #[test]
    fn tag_like_statement_reads_back() {
        let message = compose_sample(Some("URI: https://evil.example/")).unwrap();
        let parsed = parse_canonical(&message.to_string()).unwrap();
        assert_eq!(parsed.statement.as_deref(), Some("URI: https://evil.example/"));
        assert_eq!(parsed.uri.as_str(), "https://example.com/");
    }

    #[test]
    fn empty_statement_does_not_compose() {
        assert!(compose_sample(Some("")).is_err());
    }

    #[test]
    fn rejects_free_text() {
        assert!(parse_canonical("not a siwe message").is_err());
        assert!(parse_canonical("").is_err());
    }

    #[test]
    fn rejects_non_canonical_layout() {
        let without_blank_lines = SAMPLE_TEXT.replace("Test statement\n\n", "");
        assert!(parse_canonical(&without_blank_lines).is_err());

        let padded_chain_id = SAMPLE_TEXT.replace("Chain ID: 1", "Chain ID: 01");
        assert!(parse_canonical(&padded_chain_id).is_err());

        let trailing_newline = format!("{SAMPLE_TEXT}\n");
        assert!(parse_canonical(&trailing_newline).is_err());
    }

    #[test]
    fn rejects_bad_checksum() {
        let text = SAMPLE_TEXT.replace(ADDRESS, "0x32be343B94f860124dC4fEe278FDCBD38C102D88");
        assert!(parse_canonical(&text).is_err());
    }

    #[test]
    fn rejects_unknown_version() {
        let text = SAMPLE_TEXT.replace("Version: 1", "Version: 2");
        assert!(parse_canonical(&text).is_err());
    }

    #[test]
    fn rejects_short_nonce() {
        let text = SAMPLE_TEXT.replace("testnonce1234", "short");
        assert!(parse_canonical(&text).is_err());
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let text = SAMPLE_TEXT.replace("2024-01-01T01:00:00.000Z", "yesterday");
        assert!(matches!(
            parse_canonical(&text),
            Err(ParseError::TimeStamp(_))
        ));
    }

    #[test]
    fn domain_follows_authority_grammar() {
        for domain in ["example.com", "localhost:3000", "user@example.com:8443", "[::1]:80"] {
            assert!(parse_domain(domain).is_ok(), "{domain}");
        }
        for domain in [
            "",
            "exa[mple",
            "@@@",
            "a:b:c",
            "example.com/login",
            "example.com?x=1",
            "exa mple.com",
        ] {
            assert!(
                matches!(parse_domain(domain), Err(ParseError::Domain(_))),
                "{domain}"
            );
        }
    }

    #[test]
    fn statement_grammar() {
        assert!(is_valid_statement("Sign in to Example"));
        assert!(is_valid_statement("URI: https://evil.example/"));
        assert!(!is_valid_statement("line one\nline two"));
        assert!(!is_valid_statement("carriage\rreturn"));
    }
}
