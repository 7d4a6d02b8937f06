//! Represents a pet registration: owner contact details, pet attributes and
//! an optional photo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Open key/value section as supplied by clients. Keys other than the
/// required ones are kept as-is.
pub type Fields = Map<String, Value>;

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const PET_NAME: &str = "petName";
pub const PET_PHOTO: &str = "petPhoto";

/// Owner contact information (`ownerInfo`).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct OwnerInfo {
    pub fields: Fields,
}

impl OwnerInfo {
    pub fn new(fields: Fields) -> Self {
        Self { fields }
    }

    pub fn first_name(&self) -> Option<&str> {
        text_field(&self.fields, FIRST_NAME)
    }

    pub fn last_name(&self) -> Option<&str> {
        text_field(&self.fields, LAST_NAME)
    }
}

/// Pet attributes (`petInfo`) plus the photo.
///
/// The photo lives beside the open mapping rather than inside it so that it is
/// always raw bytes. On the wire it is rendered as base64 under `petPhoto`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PetInfo {
    #[serde(flatten)]
    pub fields: Fields,

    #[serde(rename = "petPhoto", default, with = "photo_base64")]
    pub pet_photo: Option<Vec<u8>>,
}

impl PetInfo {
    /// Build a section from client fields. A `petPhoto` key in the mapping is
    /// dropped; photos only arrive as binary payloads.
    pub fn new(mut fields: Fields) -> Self {
        fields.remove(PET_PHOTO);
        Self {
            fields,
            pet_photo: None,
        }
    }

    pub fn with_photo(mut self, photo: Option<Vec<u8>>) -> Self {
        self.pet_photo = photo;
        self
    }

    pub fn pet_name(&self) -> Option<&str> {
        text_field(&self.fields, PET_NAME)
    }
}

/// A stored pet registration.
///
/// Identity is the `id`; two values with the same id are the same record even
/// if one of them is a stale copy.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Assigned by the store on insert and never changed.
    pub id: Uuid,

    pub owner_info: OwnerInfo,

    pub pet_info: PetInfo,

    pub created_at: DateTime<Utc>,

    /// Bumped on every successful update.
    pub updated_at: DateTime<Utc>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Record {}

/// A record that has passed creation checks but has no id yet.
#[derive(Clone, Debug)]
pub struct NewRecord {
    pub owner_info: OwnerInfo,
    pub pet_info: PetInfo,
}

impl NewRecord {
    pub fn new(owner_info: Fields, pet_info: Fields, pet_photo: Option<Vec<u8>>) -> Self {
        Self {
            owner_info: OwnerInfo::new(owner_info),
            pet_info: PetInfo::new(pet_info).with_photo(pet_photo),
        }
    }

    /// Names of required fields that are absent, not strings, or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(self.owner_info.last_name()) {
            missing.push(LAST_NAME);
        }
        if is_blank(self.owner_info.first_name()) {
            missing.push(FIRST_NAME);
        }
        if is_blank(self.pet_info.pet_name()) {
            missing.push(PET_NAME);
        }
        missing
    }

    /// Attach store-assigned identity and timestamps.
    pub fn into_record(self, id: Uuid, now: DateTime<Utc>) -> Record {
        Record {
            id,
            owner_info: self.owner_info,
            pet_info: self.pet_info,
            created_at: now,
            updated_at: now,
        }
    }
}

fn text_field<'a>(fields: &'a Fields, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

mod photo_base64 {
    use base64::{Engine as _, engine::general_purpose};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(photo: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match photo {
            Some(bytes) => s.serialize_some(&general_purpose::STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|encoded| general_purpose::STANDARD.decode(encoded).map_err(D::Error::custom))
            .transpose()
    }
}
