//! Artifact identifiers, discovery and persistence.
//!
//! Every artifact is one YAML file named after its identifier:
//! `<KIND>_<SCOPE>_<YYYY-MM-DDTHH-MM-SSZ>.yaml`. The historical ingestion
//! file names are recognized as well (see [`ArtifactId::parse`]).

mod payload;
mod store;
mod writer;

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Instrument, UtcDateTime, ValidationError};

pub use payload::{load_calendar, load_price_series, load_sentiment};
pub use store::{ArtifactIndex, ArtifactRef};
pub use writer::{
    canonical_payload, content_digest, load_fusion, ArtifactWriter, FusionDocument,
    WrittenArtifact,
};

const GLOBAL_SCOPE: &str = "GLOBAL";

/// Kind tag carried by every artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtifactKind {
    Price,
    Calendar,
    Sentiment,
    Fusion,
}

impl ArtifactKind {
    pub const ALL: [Self; 4] = [Self::Price, Self::Calendar, Self::Sentiment, Self::Fusion];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "PRICE",
            Self::Calendar => "CALENDAR",
            Self::Sentiment => "SENTIMENT",
            Self::Fusion => "FUSION",
        }
    }

    /// Price and fusion artifacts belong to one instrument; the rest are global.
    pub const fn is_instrument_scoped(self) -> bool {
        matches!(self, Self::Price | Self::Fusion)
    }
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PRICE" => Ok(Self::Price),
            "CALENDAR" => Ok(Self::Calendar),
            "SENTIMENT" | "NEWS" => Ok(Self::Sentiment),
            "FUSION" => Ok(Self::Fusion),
            _ => Err(ValidationError::InvalidKind {
                value: value.to_owned(),
            }),
        }
    }
}

/// Instrument scope of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Instrument(Instrument),
}

impl Scope {
    pub fn instrument(&self) -> Option<&Instrument> {
        match self {
            Self::Global => None,
            Self::Instrument(instrument) => Some(instrument),
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => f.write_str(GLOBAL_SCOPE),
            Self::Instrument(instrument) => f.write_str(instrument.as_str()),
        }
    }
}

impl Serialize for Scope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Resolution of the creation timestamp embedded in an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrecision {
    Second,
    /// Legacy `<PAIR>_<YYYYMMDD>_<HHMM>` names. File modification time breaks
    /// ties between these.
    Minute,
}

/// Parsed artifact identifier (the file stem).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactId {
    kind: ArtifactKind,
    scope: Scope,
    created_at: UtcDateTime,
    precision: IdPrecision,
    name: String,
}

impl ArtifactId {
    /// Canonical identifier for a new artifact.
    pub fn new(kind: ArtifactKind, scope: Scope, created_at: UtcDateTime) -> Self {
        let created_at = created_at.truncate_to_seconds();
        let name = format!("{kind}_{scope}_{}", created_at.format_compact());
        Self {
            kind,
            scope,
            created_at,
            precision: IdPrecision::Second,
            name,
        }
    }

    /// Parse an identifier.
    ///
    /// Recognized forms:
    /// - `PRICE_<PAIR>_<ts>`, `FUSION_<PAIR>_<ts>`
    /// - `CALENDAR_GLOBAL_<ts>`, `SENTIMENT_GLOBAL_<ts>`
    /// - `CALENDAR_<ts>`, `NEWS_<ts>`, `PATTERN_FUSION_<PAIR>_<ts>`
    /// - `<PAIR>_<YYYYMMDD>_<HHMM>`, `<PAIR>_<ts>` (price)
    ///
    /// where `<ts>` is `YYYY-MM-DDTHH-MM-SS[.fraction]Z`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let name = input.trim();
        let invalid = || ValidationError::InvalidIdentifier {
            value: input.to_owned(),
        };

        if let Some(rest) = strip_prefix_ignore_case(name, "PATTERN_FUSION_") {
            let (pair, ts) = rest.rsplit_once('_').ok_or_else(invalid)?;
            return Self::parsed(name, ArtifactKind::Fusion, instrument_scope(pair)?, ts);
        }

        let (head, rest) = name.split_once('_').ok_or_else(invalid)?;
        match head.to_ascii_uppercase().as_str() {
            "PRICE" | "FUSION" => {
                let kind = ArtifactKind::from_str(head)?;
                let (pair, ts) = rest.rsplit_once('_').ok_or_else(invalid)?;
                Self::parsed(name, kind, instrument_scope(pair)?, ts)
            }
            "CALENDAR" | "SENTIMENT" | "NEWS" => {
                let kind = ArtifactKind::from_str(head)?;
                let ts = match rest.split_once('_') {
                    Some((scope, ts)) if scope.eq_ignore_ascii_case(GLOBAL_SCOPE) => ts,
                    Some(_) => return Err(invalid()),
                    None => rest,
                };
                Self::parsed(name, kind, Scope::Global, ts)
            }
            _ => {
                let scope = instrument_scope(head).map_err(|_| invalid())?;
                match rest.split_once('_') {
                    Some((date, clock)) => {
                        let created_at = UtcDateTime::from_compact_minute(date, clock)
                            .map_err(|_| invalid())?;
                        Ok(Self {
                            kind: ArtifactKind::Price,
                            scope,
                            created_at,
                            precision: IdPrecision::Minute,
                            name: name.to_owned(),
                        })
                    }
                    None => Self::parsed(name, ArtifactKind::Price, scope, rest),
                }
            }
        }
    }

    fn parsed(
        name: &str,
        kind: ArtifactKind,
        scope: Scope,
        ts: &str,
    ) -> Result<Self, ValidationError> {
        let created_at =
            UtcDateTime::parse_compact(ts).map_err(|_| ValidationError::InvalidIdentifier {
                value: name.to_owned(),
            })?;
        Ok(Self {
            kind,
            scope,
            created_at,
            precision: IdPrecision::Second,
            name: name.to_owned(),
        })
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn created_at(&self) -> UtcDateTime {
        self.created_at
    }

    pub fn precision(&self) -> IdPrecision {
        self.precision
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> String {
        format!("{}.yaml", self.name)
    }
}

impl Display for ArtifactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for ArtifactId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for ArtifactId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Typed `(kind, scope)` query against an [`ArtifactIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSelector {
    kind: ArtifactKind,
    scope: Scope,
}

impl ArtifactSelector {
    pub fn price(instrument: &Instrument) -> Self {
        Self {
            kind: ArtifactKind::Price,
            scope: Scope::Instrument(instrument.clone()),
        }
    }

    pub fn fusion(instrument: &Instrument) -> Self {
        Self {
            kind: ArtifactKind::Fusion,
            scope: Scope::Instrument(instrument.clone()),
        }
    }

    pub fn calendar() -> Self {
        Self {
            kind: ArtifactKind::Calendar,
            scope: Scope::Global,
        }
    }

    pub fn sentiment() -> Self {
        Self {
            kind: ArtifactKind::Sentiment,
            scope: Scope::Global,
        }
    }

    /// Build a selector from a kind and an optional instrument, rejecting
    /// combinations that cannot match anything.
    pub fn for_kind(
        kind: ArtifactKind,
        instrument: Option<&Instrument>,
    ) -> Result<Self, ValidationError> {
        match (kind.is_instrument_scoped(), instrument) {
            (true, Some(instrument)) => Ok(Self {
                kind,
                scope: Scope::Instrument(instrument.clone()),
            }),
            (true, None) => Err(ValidationError::EmptyInstrument),
            (false, _) => Ok(Self {
                kind,
                scope: Scope::Global,
            }),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn matches(&self, id: &ArtifactId) -> bool {
        id.kind == self.kind && id.scope == self.scope
    }
}

/// Recency order between two identifiers with no filesystem information.
pub fn compare_recency(left: &ArtifactId, right: &ArtifactId) -> Ordering {
    left.created_at
        .cmp(&right.created_at)
        .then_with(|| left.name.cmp(&right.name))
}

fn instrument_scope(pair: &str) -> Result<Scope, ValidationError> {
    Instrument::parse(pair).map(Scope::Instrument)
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}
