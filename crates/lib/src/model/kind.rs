//! Item kinds, described as data.
//!
//! Every kind is a [`KindDescriptor`]: the collection it lives in, its own
//! fields, and a set of [`Capability`]s that each contribute shared fields.
//! Behavior that differs between kinds (partitioning by "started", search,
//! ratings) asks the descriptor instead of switching on the kind.

use std::{fmt, str::FromStr};

use super::{ModelError, Property, PropertyKind};
use crate::doc::Value;

/// One kind of tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Read,
    Watch,
    Hear,
    Play,
    Dine,
    Build,
    Do,
}

/// A bundle of shared fields and behavior a kind can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `tags` and `link`.
    Taggable,
    /// `completed`, explicitly null while incomplete.
    Completable,
    /// `started`; incomplete items split into started and pending.
    Startable,
    /// `rating` and `recommender`.
    Rateable,
}

/// Default value of a kind field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Absent until set.
    Absent,
    /// Explicit null.
    Null,
    Text(&'static str),
    Bool(bool),
}

impl FieldDefault {
    fn to_value(self) -> Option<Value> {
        match self {
            FieldDefault::Absent => None,
            FieldDefault::Null => Some(Value::Null),
            FieldDefault::Text(text) => Some(Value::from(text)),
            FieldDefault::Bool(b) => Some(Value::Bool(b)),
        }
    }
}

/// One field of an item document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub default: FieldDefault,
    /// Whether free-text search looks inside this field.
    pub searchable: bool,
    /// Allowed values, if the field is an enumeration.
    pub choices: &'static [&'static str],
}

impl FieldSpec {
    const fn text(name: &'static str, default: FieldDefault, searchable: bool) -> Self {
        Self {
            name,
            kind: PropertyKind::Scalar,
            default,
            searchable,
            choices: &[],
        }
    }

    const fn choice(name: &'static str, default: &'static str, choices: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: PropertyKind::Scalar,
            default: FieldDefault::Text(default),
            searchable: false,
            choices,
        }
    }

    const fn flag(name: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Scalar,
            default: FieldDefault::Bool(false),
            searchable: false,
            choices: &[],
        }
    }

    /// Builds the property for this field.
    pub fn property(&self) -> Property {
        Property::new(self.name, self.kind, self.default.to_value())
    }
}

pub const RATINGS: &[&str] = &["none", "bad", "meh", "ok", "good", "great"];
pub const READ_TYPES: &[&str] = &["article", "book", "paper"];
pub const WATCH_TYPES: &[&str] = &["show", "film", "video", "other"];
pub const HEAR_TYPES: &[&str] = &["song", "album", "other"];
pub const PLATFORMS: &[&str] = &[
    "pc", "mobile", "switch", "ps4", "xbox", "3ds", "vita", "wiiu", "ps3", "wii", "table",
];

const TAGGABLE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "tags",
        kind: PropertyKind::Tags,
        default: FieldDefault::Absent,
        searchable: false,
        choices: &[],
    },
    FieldSpec::text("link", FieldDefault::Absent, true),
];
const COMPLETABLE_FIELDS: &[FieldSpec] = &[FieldSpec::text("completed", FieldDefault::Null, false)];
const STARTABLE_FIELDS: &[FieldSpec] = &[FieldSpec::text("started", FieldDefault::Absent, false)];
const RATEABLE_FIELDS: &[FieldSpec] = &[
    FieldSpec::choice("rating", "none", RATINGS),
    FieldSpec::text("recommender", FieldDefault::Absent, true),
];

impl Capability {
    /// Fields contributed by this capability.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Capability::Taggable => TAGGABLE_FIELDS,
            Capability::Completable => COMPLETABLE_FIELDS,
            Capability::Startable => STARTABLE_FIELDS,
            Capability::Rateable => RATEABLE_FIELDS,
        }
    }
}

/// Everything kind-specific about an item.
#[derive(Debug)]
pub struct KindDescriptor {
    pub kind: ItemKind,
    /// Collection id under the user's document.
    pub collection: &'static str,
    /// The field new items take their text in.
    pub title_field: &'static str,
    pub fields: &'static [FieldSpec],
    pub capabilities: &'static [Capability],
}

impl KindDescriptor {
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Every field of this kind: capability fields first, then own fields.
    pub fn all_fields(&self) -> impl Iterator<Item = &'static FieldSpec> + '_ {
        self.capabilities
            .iter()
            .flat_map(|c| c.fields().iter())
            .chain(self.fields.iter())
    }
}

use Capability::*;

const CONSUMABLE: &[Capability] = &[Taggable, Completable, Rateable];
const CONSUMABLE_STARTABLE: &[Capability] = &[Taggable, Completable, Startable, Rateable];

static READ: KindDescriptor = KindDescriptor {
    kind: ItemKind::Read,
    collection: "read",
    title_field: "title",
    fields: &[
        FieldSpec::text("title", FieldDefault::Text(""), true),
        FieldSpec::text("author", FieldDefault::Absent, true),
        FieldSpec::choice("type", "book", READ_TYPES),
        FieldSpec::flag("abandoned"),
    ],
    capabilities: CONSUMABLE_STARTABLE,
};

static WATCH: KindDescriptor = KindDescriptor {
    kind: ItemKind::Watch,
    collection: "watch",
    title_field: "title",
    fields: &[
        FieldSpec::text("title", FieldDefault::Text(""), true),
        FieldSpec::text("director", FieldDefault::Absent, true),
        FieldSpec::choice("type", "film", WATCH_TYPES),
    ],
    capabilities: CONSUMABLE_STARTABLE,
};

static HEAR: KindDescriptor = KindDescriptor {
    kind: ItemKind::Hear,
    collection: "hear",
    title_field: "title",
    fields: &[
        FieldSpec::text("title", FieldDefault::Text(""), true),
        FieldSpec::text("artist", FieldDefault::Absent, true),
        FieldSpec::choice("type", "song", HEAR_TYPES),
    ],
    capabilities: CONSUMABLE,
};

static PLAY: KindDescriptor = KindDescriptor {
    kind: ItemKind::Play,
    collection: "play",
    title_field: "title",
    fields: &[
        FieldSpec::text("title", FieldDefault::Text(""), true),
        FieldSpec {
            name: "platform",
            kind: PropertyKind::Scalar,
            default: FieldDefault::Text("pc"),
            searchable: true,
            choices: PLATFORMS,
        },
        FieldSpec::flag("credits"),
    ],
    capabilities: CONSUMABLE_STARTABLE,
};

static DINE: KindDescriptor = KindDescriptor {
    kind: ItemKind::Dine,
    collection: "dine",
    title_field: "name",
    fields: &[
        FieldSpec::text("name", FieldDefault::Text(""), true),
        FieldSpec::text("location", FieldDefault::Absent, true),
    ],
    capabilities: CONSUMABLE,
};

static BUILD: KindDescriptor = KindDescriptor {
    kind: ItemKind::Build,
    collection: "build",
    title_field: "text",
    fields: &[FieldSpec::text("text", FieldDefault::Text(""), true)],
    capabilities: &[Taggable, Completable, Startable],
};

static DO: KindDescriptor = KindDescriptor {
    kind: ItemKind::Do,
    collection: "do",
    title_field: "text",
    fields: &[FieldSpec::text("text", FieldDefault::Text(""), true)],
    capabilities: &[Taggable, Completable],
};

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        ItemKind::Read,
        ItemKind::Watch,
        ItemKind::Hear,
        ItemKind::Play,
        ItemKind::Dine,
        ItemKind::Build,
        ItemKind::Do,
    ];

    pub fn descriptor(self) -> &'static KindDescriptor {
        match self {
            ItemKind::Read => &READ,
            ItemKind::Watch => &WATCH,
            ItemKind::Hear => &HEAR,
            ItemKind::Play => &PLAY,
            ItemKind::Dine => &DINE,
            ItemKind::Build => &BUILD,
            ItemKind::Do => &DO,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().collection
    }

    pub fn has(self, capability: Capability) -> bool {
        self.descriptor().has(capability)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownKind { kind: s.to_string() })
    }
}
