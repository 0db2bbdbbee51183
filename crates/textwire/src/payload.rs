use std::cell::RefCell;
use std::rc::Rc;

use clap::ValueEnum;
use serde::Serialize;
use textwire_endpoint::{HandlerError, Messenger, SendReceipt, Subscription};
use textwire_serial::{ArraySerializer, Int32, Str, UInt8};
use textwire_transport::Transport;

use crate::exit::{endpoint_error, CliError, CliResult, USAGE};

/// Schema of the values a command packs or unpacks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// UTF-16 string.
    Text,
    /// Length-prefixed byte array.
    Bytes,
    /// Length-prefixed array of little-endian i32.
    Ints,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Ints => "ints",
        }
    }
}

/// One decoded value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
    Ints(Vec<i32>),
}

/// A completed message as seen by `unpack`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Received {
    pub endpoint: String,
    pub kind: Kind,
    pub value: Payload,
}

impl Payload {
    /// Parse command-line input for `kind`.
    pub fn parse(kind: Kind, input: Vec<u8>) -> CliResult<Self> {
        match kind {
            Kind::Bytes => Ok(Self::Bytes(input)),
            Kind::Text => String::from_utf8(input)
                .map(Self::Text)
                .map_err(|err| CliError::new(USAGE, format!("text payload is not UTF-8: {err}"))),
            Kind::Ints => {
                let text = String::from_utf8(input).map_err(|err| {
                    CliError::new(USAGE, format!("ints payload is not UTF-8: {err}"))
                })?;
                text.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|item| !item.is_empty())
                    .map(|item| {
                        item.parse::<i32>().map_err(|err| {
                            CliError::new(USAGE, format!("invalid integer {item:?}: {err}"))
                        })
                    })
                    .collect::<CliResult<Vec<_>>>()
                    .map(Self::Ints)
            }
        }
    }

    /// Human-readable rendering used by table, pretty and raw output.
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => text.to_string(),
                Err(_) => format!("<binary {} bytes>", bytes.len()),
            },
            Self::Ints(values) => values
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn send<T: Transport>(
        &self,
        messenger: &mut Messenger<T>,
        endpoint: &str,
    ) -> CliResult<SendReceipt> {
        let result = match self {
            Self::Text(text) => messenger.send(endpoint, &Str, text),
            Self::Bytes(bytes) => messenger.send(endpoint, &ArraySerializer::new(UInt8), bytes),
            Self::Ints(values) => messenger.send(endpoint, &ArraySerializer::new(Int32), values),
        };
        result.map_err(|err| endpoint_error("pack failed", err))
    }
}

/// Subscribe to `endpoint`, pushing decoded `kind` values into `sink`.
pub fn listen<T: Transport>(
    messenger: &mut Messenger<T>,
    endpoint: &str,
    kind: Kind,
    sink: Rc<RefCell<Vec<Received>>>,
) -> Subscription {
    let name = endpoint.to_string();
    let push = move |value: Payload| {
        sink.borrow_mut().push(Received {
            endpoint: name.clone(),
            kind,
            value,
        });
        Ok::<(), HandlerError>(())
    };

    match kind {
        Kind::Text => messenger.listen(endpoint, Str, move |s| push(Payload::Text(s))),
        Kind::Bytes => messenger.listen(endpoint, ArraySerializer::new(UInt8), move |b| {
            push(Payload::Bytes(b))
        }),
        Kind::Ints => messenger.listen(endpoint, ArraySerializer::new(Int32), move |v| {
            push(Payload::Ints(v))
        }),
    }
}
