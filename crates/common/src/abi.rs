//! # Contract ABI Codec
//!
//! Minimal Solidity ABI encoder/decoder covering the types the merchfund
//! contracts expose.
//!
//! ## Supported Types
//!
//! | [`ParamType`] | Solidity | Carried as |
//! |---------------|----------|------------|
//! | `Address` | `address` | [`Address`] |
//! | `Uint` | `uint256` | `u128` (decode fails on overflow) |
//! | `Bool` | `bool` | `bool` |
//! | `String` | `string` | `String` |
//! | `Bytes` | `bytes` | `Vec<u8>` |
//! | `FixedBytes32` | `bytes32` | `[u8; 32]` |
//! | `Array(T)` | `T[]` | `Vec<Token>` |
//! | `Tuple(..)` | `(..)` / struct | `Vec<Token>` |
//!
//! `ParamType` only holds `'static` references so [`Function`] and
//! [`Event`] descriptors can be declared as `const` items.
//!
//! ## Layout
//!
//! ```text
//! sequence := head(t1) .. head(tn) tail(t1) .. tail(tn)
//! head(t)  := encode(t)            if t is static
//!           | offset-of-tail(t)    if t is dynamic (relative to sequence start)
//! ```
//!
//! ## Safety
//!
//! Decoding never panics: every offset and length is bounds-checked and
//! reported as [`AbiError`].

use thiserror::Error;

use crate::crypto::{keccak256, selector};
use crate::types::Address;

const WORD: usize = 32;

// ════════════════════════════════════════════════════════════════════════════
// ERRORS
// ════════════════════════════════════════════════════════════════════════════

/// ABI encoding/decoding failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbiError {
    /// Argument does not match the declared parameter type.
    #[error("type mismatch at argument {index}: expected {expected}")]
    TypeMismatch { index: usize, expected: String },

    /// Wrong number of arguments for the function.
    #[error("argument count mismatch: expected {expected}, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    /// Offset or length points outside the input.
    #[error("out of bounds: need {needed} bytes at offset {offset}, input has {len}")]
    OutOfBounds { offset: usize, needed: usize, len: usize },

    /// A `uint256` word does not fit in 128 bits.
    #[error("uint256 value does not fit in 128 bits")]
    Overflow,

    /// A `bool` word is neither 0 nor 1.
    #[error("invalid bool word")]
    InvalidBool,

    /// An `address` word has non-zero high bytes.
    #[error("invalid address word")]
    InvalidAddress,

    /// A `string` payload is not UTF-8.
    #[error("string is not valid utf-8")]
    InvalidUtf8,

    /// Log topic 0 does not match the event signature.
    #[error("log does not match event {0}")]
    EventMismatch(String),
}

// ════════════════════════════════════════════════════════════════════════════
// TYPES & TOKENS
// ════════════════════════════════════════════════════════════════════════════

/// ABI parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Uint,
    Bool,
    String,
    Bytes,
    FixedBytes32,
    Array(&'static ParamType),
    Tuple(&'static [ParamType]),
}

impl ParamType {
    /// Whether the type is encoded out-of-line (via an offset in the head).
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::String | ParamType::Bytes | ParamType::Array(_) => true,
            ParamType::Tuple(items) => items.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    /// Canonical type name as used in signatures.
    pub fn canonical(&self) -> String {
        match self {
            ParamType::Address => "address".to_string(),
            ParamType::Uint => "uint256".to_string(),
            ParamType::Bool => "bool".to_string(),
            ParamType::String => "string".to_string(),
            ParamType::Bytes => "bytes".to_string(),
            ParamType::FixedBytes32 => "bytes32".to_string(),
            ParamType::Array(inner) => format!("{}[]", inner.canonical()),
            ParamType::Tuple(items) => format!("({})", join_canonical(items)),
        }
    }

    fn head_size(&self) -> usize {
        match self {
            ParamType::Tuple(items) if !self.is_dynamic() => {
                items.iter().map(ParamType::head_size).sum()
            }
            _ => WORD,
        }
    }
}

fn join_canonical(types: &[ParamType]) -> String {
    types
        .iter()
        .map(ParamType::canonical)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decoded (or to-be-encoded) ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(u128),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes32([u8; 32]),
    Array(Vec<Token>),
    Tuple(Vec<Token>),
}

impl Token {
    pub fn into_uint(self) -> Option<u128> {
        match self {
            Token::Uint(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_address(self) -> Option<Address> {
        match self {
            Token::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Token>> {
        match self {
            Token::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_tuple(self) -> Option<Vec<Token>> {
        match self {
            Token::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Structural type check against a declared parameter type.
    pub fn matches(&self, ty: &ParamType) -> bool {
        match (self, ty) {
            (Token::Address(_), ParamType::Address)
            | (Token::Uint(_), ParamType::Uint)
            | (Token::Bool(_), ParamType::Bool)
            | (Token::String(_), ParamType::String)
            | (Token::Bytes(_), ParamType::Bytes)
            | (Token::FixedBytes32(_), ParamType::FixedBytes32) => true,
            (Token::Array(items), ParamType::Array(inner)) => {
                items.iter().all(|t| t.matches(inner))
            }
            (Token::Tuple(items), ParamType::Tuple(types)) => {
                items.len() == types.len()
                    && items.iter().zip(types.iter()).all(|(t, ty)| t.matches(ty))
            }
            _ => false,
        }
    }

    fn is_dynamic(&self) -> bool {
        match self {
            Token::String(_) | Token::Bytes(_) | Token::Array(_) => true,
            Token::Tuple(items) => items.iter().any(Token::is_dynamic),
            _ => false,
        }
    }

    fn head_size(&self) -> usize {
        match self {
            Token::Tuple(items) if !self.is_dynamic() => items.iter().map(Token::head_size).sum(),
            _ => WORD,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ENCODING
// ════════════════════════════════════════════════════════════════════════════

/// Encode a token sequence (no type checking).
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    encode_sequence(tokens)
}

/// Type-check `args` against `types`, then encode.
pub fn encode_args(types: &[ParamType], args: &[Token]) -> Result<Vec<u8>, AbiError> {
    if types.len() != args.len() {
        return Err(AbiError::ArgumentCount {
            expected: types.len(),
            got: args.len(),
        });
    }
    for (index, (ty, arg)) in types.iter().zip(args.iter()).enumerate() {
        if !arg.matches(ty) {
            return Err(AbiError::TypeMismatch {
                index,
                expected: ty.canonical(),
            });
        }
    }
    Ok(encode_sequence(args))
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn encode_sequence(tokens: &[Token]) -> Vec<u8> {
    let head_len: usize = tokens.iter().map(Token::head_size).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
            tail.extend(encode_token(token));
        } else {
            head.extend(encode_token(token));
        }
    }

    head.extend(tail);
    head
}

fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&uint_word(bytes.len() as u128));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded, 0);
    out
}

fn encode_token(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(a) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(a.as_bytes());
            word.to_vec()
        }
        Token::Uint(v) => uint_word(*v).to_vec(),
        Token::Bool(b) => uint_word(u128::from(*b)).to_vec(),
        Token::FixedBytes32(b) => b.to_vec(),
        Token::String(s) => encode_bytes(s.as_bytes()),
        Token::Bytes(b) => encode_bytes(b),
        Token::Array(items) => {
            let mut out = uint_word(items.len() as u128).to_vec();
            out.extend(encode_sequence(items));
            out
        }
        Token::Tuple(items) => encode_sequence(items),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DECODING
// ════════════════════════════════════════════════════════════════════════════

/// Decode `data` as a sequence of `types`.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    decode_sequence(types, data, 0)
}

fn word(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    slice(data, at, WORD)
}

fn slice(data: &[u8], at: usize, len: usize) -> Result<&[u8], AbiError> {
    at.checked_add(len)
        .and_then(|end| data.get(at..end))
        .ok_or(AbiError::OutOfBounds {
            offset: at,
            needed: len,
            len: data.len(),
        })
}

fn read_uint(data: &[u8], at: usize) -> Result<u128, AbiError> {
    let w = word(data, at)?;
    if w[..16].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow);
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&w[16..]);
    Ok(u128::from_be_bytes(low))
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, AbiError> {
    let value = read_uint(data, at).map_err(|_| AbiError::OutOfBounds {
        offset: at,
        needed: WORD,
        len: data.len(),
    })?;
    usize::try_from(value).map_err(|_| AbiError::OutOfBounds {
        offset: at,
        needed: WORD,
        len: data.len(),
    })
}

fn decode_sequence(types: &[ParamType], data: &[u8], base: usize) -> Result<Vec<Token>, AbiError> {
    let mut out = Vec::with_capacity(types.len());
    let mut cursor = base;

    for ty in types {
        let token = if ty.is_dynamic() {
            let rel = read_usize(data, cursor)?;
            let start = base.checked_add(rel).ok_or(AbiError::OutOfBounds {
                offset: base,
                needed: rel,
                len: data.len(),
            })?;
            decode_at(ty, data, start)?
        } else {
            decode_at(ty, data, cursor)?
        };
        out.push(token);
        cursor = cursor.saturating_add(ty.head_size());
    }

    Ok(out)
}

fn decode_at(ty: &ParamType, data: &[u8], at: usize) -> Result<Token, AbiError> {
    match ty {
        ParamType::Address => {
            let w = word(data, at)?;
            if w[..12].iter().any(|b| *b != 0) {
                return Err(AbiError::InvalidAddress);
            }
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&w[12..]);
            Ok(Token::Address(Address(bytes)))
        }
        ParamType::Uint => read_uint(data, at).map(Token::Uint),
        ParamType::Bool => match read_uint(data, at) {
            Ok(0) => Ok(Token::Bool(false)),
            Ok(1) => Ok(Token::Bool(true)),
            _ => Err(AbiError::InvalidBool),
        },
        ParamType::FixedBytes32 => {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(word(data, at)?);
            Ok(Token::FixedBytes32(bytes))
        }
        ParamType::Bytes => decode_bytes(data, at).map(|b| Token::Bytes(b.to_vec())),
        ParamType::String => {
            let bytes = decode_bytes(data, at)?;
            String::from_utf8(bytes.to_vec())
                .map(Token::String)
                .map_err(|_| AbiError::InvalidUtf8)
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, at)?;
            // every element needs at least one head word
            if len > data.len() / WORD {
                return Err(AbiError::OutOfBounds {
                    offset: at,
                    needed: len.saturating_mul(WORD),
                    len: data.len(),
                });
            }
            let start = at.checked_add(WORD).ok_or(AbiError::OutOfBounds {
                offset: at,
                needed: WORD,
                len: data.len(),
            })?;
            let types = vec![**inner; len];
            decode_sequence(&types, data, start).map(Token::Array)
        }
        ParamType::Tuple(items) => decode_sequence(items, data, at).map(Token::Tuple),
    }
}

fn decode_bytes(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    let len = read_usize(data, at)?;
    let start = at.checked_add(WORD).ok_or(AbiError::OutOfBounds {
        offset: at,
        needed: WORD,
        len: data.len(),
    })?;
    slice(data, start, len)
}

// ════════════════════════════════════════════════════════════════════════════
// FUNCTION & EVENT DESCRIPTORS
// ════════════════════════════════════════════════════════════════════════════

/// Contract function descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Function {
    pub name: &'static str,
    pub inputs: &'static [ParamType],
    pub outputs: &'static [ParamType],
}

impl Function {
    /// Canonical signature, e.g. `donate(uint256)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, join_canonical(self.inputs))
    }

    pub fn selector(&self) -> [u8; 4] {
        selector(&self.signature())
    }

    /// Calldata: selector followed by the encoded arguments.
    pub fn encode_call(&self, args: &[Token]) -> Result<Vec<u8>, AbiError> {
        let mut out = self.selector().to_vec();
        out.extend(encode_args(self.inputs, args)?);
        Ok(out)
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        decode(self.outputs, data)
    }
}

/// Event parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventParam {
    pub ty: ParamType,
    pub indexed: bool,
}

/// Contract event descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub name: &'static str,
    pub params: &'static [EventParam],
}

impl Event {
    pub fn signature(&self) -> String {
        let types: Vec<ParamType> = self.params.iter().map(|p| p.ty).collect();
        format!("{}({})", self.name, join_canonical(&types))
    }

    /// Topic 0 of every log emitted for this event.
    pub fn topic0(&self) -> [u8; 32] {
        keccak256(self.signature().as_bytes())
    }

    /// Decode a log into tokens in declaration order.
    ///
    /// Indexed dynamic parameters only carry their hash in the topic and
    /// come back as `FixedBytes32`.
    pub fn decode_log(&self, topics: &[[u8; 32]], data: &[u8]) -> Result<Vec<Token>, AbiError> {
        if topics.first() != Some(&self.topic0()) {
            return Err(AbiError::EventMismatch(self.name.to_string()));
        }

        let body_types: Vec<ParamType> = self
            .params
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.ty)
            .collect();
        let mut body = decode(&body_types, data)?.into_iter();
        let mut indexed_topics = topics[1..].iter();

        let mut out = Vec::with_capacity(self.params.len());
        for param in self.params {
            if param.indexed {
                let topic = indexed_topics
                    .next()
                    .ok_or(AbiError::EventMismatch(self.name.to_string()))?;
                if param.ty.is_dynamic() {
                    out.push(Token::FixedBytes32(*topic));
                } else {
                    out.push(decode_at(&param.ty, topic, 0)?);
                }
            } else {
                let token = body
                    .next()
                    .ok_or(AbiError::EventMismatch(self.name.to_string()))?;
                out.push(token);
            }
        }
        Ok(out)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD_FIELDS: &[ParamType] = &[ParamType::Uint, ParamType::String, ParamType::Bool];
    const RECORD: ParamType = ParamType::Tuple(RECORD_FIELDS);
    const PAIR_FIELDS: &[ParamType] = &[ParamType::Address, ParamType::Uint];
    const PAIR: ParamType = ParamType::Tuple(PAIR_FIELDS);

    fn hex_words(data: &[u8]) -> Vec<String> {
        data.chunks(32).map(hex::encode).collect()
    }

    #[test]
    fn canonical_names() {
        assert_eq!(RECORD.canonical(), "(uint256,string,bool)");
        assert_eq!(ParamType::Array(&PAIR).canonical(), "(address,uint256)[]");
    }

    #[test]
    fn encode_string_layout() {
        let encoded = encode(&[Token::String("abc".to_string())]);
        let words = hex_words(&encoded);
        assert_eq!(words.len(), 3);
        assert!(words[0].ends_with("20"));
        assert!(words[1].ends_with("03"));
        assert!(words[2].starts_with("616263"));
    }

    #[test]
    fn encode_call_matches_known_transfer_calldata() {
        const TRANSFER: Function = Function {
            name: "transfer",
            inputs: &[ParamType::Address, ParamType::Uint],
            outputs: &[ParamType::Bool],
        };
        let calldata = TRANSFER
            .encode_call(&[Token::Address(Address([0x11; 20])), Token::Uint(1)])
            .unwrap();
        assert_eq!(&calldata[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(calldata.len(), 4 + 64);
        assert_eq!(calldata[4 + 63], 1);
    }

    #[test]
    fn encode_args_rejects_mismatch() {
        let err = encode_args(&[ParamType::Uint], &[Token::Bool(true)]).unwrap_err();
        assert_eq!(err, AbiError::TypeMismatch { index: 0, expected: "uint256".into() });

        let err = encode_args(&[ParamType::Uint], &[]).unwrap_err();
        assert_eq!(err, AbiError::ArgumentCount { expected: 1, got: 0 });
    }

    #[test]
    fn decode_nested_dynamic_tuple() {
        let value = Token::Tuple(vec![
            Token::Uint(7),
            Token::String("winter hoodie".to_string()),
            Token::Bool(true),
        ]);
        let encoded = encode(&[value.clone()]);
        let decoded = decode(&[RECORD], &encoded).unwrap();
        assert_eq!(decoded, vec![value]);
    }

    #[test]
    fn decode_array_of_static_tuples() {
        let items = vec![
            Token::Tuple(vec![Token::Address(Address([1; 20])), Token::Uint(10)]),
            Token::Tuple(vec![Token::Address(Address([2; 20])), Token::Uint(20)]),
        ];
        let encoded = encode(&[Token::Array(items.clone())]);
        // offset, length, 2 * 2 words
        assert_eq!(encoded.len(), 32 * 6);
        let decoded = decode(&[ParamType::Array(&PAIR)], &encoded).unwrap();
        assert_eq!(decoded, vec![Token::Array(items)]);
    }

    #[test]
    fn decode_rejects_uint_overflow() {
        let mut data = [0u8; 32];
        data[0] = 1;
        assert_eq!(decode(&[ParamType::Uint], &data), Err(AbiError::Overflow));
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let encoded = encode(&[Token::String("truncated".to_string())]);
        let err = decode(&[ParamType::String], &encoded[..40]).unwrap_err();
        assert!(matches!(err, AbiError::OutOfBounds { .. }));
    }

    #[test]
    fn decode_rejects_huge_array_length() {
        let mut data = vec![0u8; 64];
        data[31] = 0x20;
        data[32..64].copy_from_slice(&[0xff; 32]);
        let err = decode(&[ParamType::Array(&ParamType::Uint)], &data).unwrap_err();
        assert!(matches!(err, AbiError::OutOfBounds { .. }));
    }

    #[test]
    fn decode_rejects_bad_bool() {
        let mut data = [0u8; 32];
        data[31] = 2;
        assert_eq!(decode(&[ParamType::Bool], &data), Err(AbiError::InvalidBool));
    }

    #[test]
    fn event_decode_mixes_topics_and_data() {
        const PARAMS: &[EventParam] = &[
            EventParam { ty: ParamType::Uint, indexed: true },
            EventParam { ty: ParamType::String, indexed: false },
        ];
        const CREATED: Event = Event { name: "Created", params: PARAMS };

        let mut id_topic = [0u8; 32];
        id_topic[31] = 9;
        let data = encode(&[Token::String("x".into())]);
        let tokens = CREATED.decode_log(&[CREATED.topic0(), id_topic], &data).unwrap();
        assert_eq!(tokens, vec![Token::Uint(9), Token::String("x".into())]);

        let err = CREATED.decode_log(&[[0u8; 32], id_topic], &data).unwrap_err();
        assert_eq!(err, AbiError::EventMismatch("Created".into()));
    }
}
