use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
        DecodePaddingMode,
    },
    Engine,
};
use indy_api_types::errors::prelude::*;

const URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const STANDARD_INDIFFERENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn encode(doc: &[u8]) -> String {
    STANDARD.encode(doc)
}

pub fn decode(doc: &str) -> IndyResult<Vec<u8>> {
    STANDARD_INDIFFERENT
        .decode(doc)
        .to_indy(IndyErrorKind::InvalidStructure, "Invalid base64 sequence")
}

/// Url safe alphabet with padding.
pub fn encode_urlsafe(doc: &[u8]) -> String {
    URL_SAFE.encode(doc)
}

/// Accepts both padded and unpadded input.
pub fn decode_urlsafe(doc: &str) -> IndyResult<Vec<u8>> {
    URL_SAFE
        .decode(doc)
        .to_indy(IndyErrorKind::InvalidStructure, "Invalid base64URL_SAFE sequence")
}
