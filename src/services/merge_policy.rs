//! Rules for folding client input into an existing record.
//!
//! Two strategies, chosen by HTTP verb:
//! - `Merge` (PATCH): supplied keys are laid over the existing section,
//!   unmentioned keys survive.
//! - `Replace` (PUT): a supplied section replaces the existing one wholesale.
//!
//! In both, an omitted section is left alone and a supplied photo is applied
//! last, whether or not `petInfo` itself was supplied. Nothing here touches
//! the store or fails; decoding the input is the caller's job.

use crate::models::record::{Fields, PetInfo, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Merge,
    Replace,
}

/// Partial input for an update. `None` means the section was omitted, which is
/// not the same as `Some` of an empty mapping.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub owner_info: Option<Fields>,
    pub pet_info: Option<Fields>,
    pub pet_photo: Option<Vec<u8>>,
}

pub fn apply(mode: UpdateMode, existing: Record, patch: RecordPatch) -> Record {
    match mode {
        UpdateMode::Merge => merge_update(existing, patch),
        UpdateMode::Replace => replace_update(existing, patch),
    }
}

pub fn merge_update(mut existing: Record, patch: RecordPatch) -> Record {
    if let Some(owner) = patch.owner_info {
        existing.owner_info.fields.extend(owner);
    }
    if let Some(pet) = patch.pet_info {
        // Goes through PetInfo::new so a stray `petPhoto` key is dropped.
        existing.pet_info.fields.extend(PetInfo::new(pet).fields);
    }
    overwrite_photo(existing, patch.pet_photo)
}

pub fn replace_update(mut existing: Record, patch: RecordPatch) -> Record {
    if let Some(owner) = patch.owner_info {
        existing.owner_info.fields = owner;
    }
    if let Some(pet) = patch.pet_info {
        existing.pet_info = PetInfo::new(pet);
    }
    overwrite_photo(existing, patch.pet_photo)
}

fn overwrite_photo(mut record: Record, photo: Option<Vec<u8>>) -> Record {
    if photo.is_some() {
        record.pet_info.pet_photo = photo;
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::NewRecord;
    use chrono::Utc;
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn existing() -> Record {
        NewRecord::new(
            fields(json!({"firstName": "A", "lastName": "B", "phone": "123"})),
            fields(json!({"petName": "Rex", "breed": "lab"})),
            Some(vec![1, 1, 1]),
        )
        .into_record(Uuid::new_v4(), Utc::now())
    }

    fn owner_patch() -> RecordPatch {
        RecordPatch {
            owner_info: Some(fields(json!({"phone": "999"}))),
            ..Default::default()
        }
    }

    #[test]
    fn merge_preserves_unmentioned_owner_fields() {
        let merged = merge_update(existing(), owner_patch());
        assert_eq!(
            Value::Object(merged.owner_info.fields),
            json!({"firstName": "A", "lastName": "B", "phone": "999"})
        );
    }

    #[test]
    fn replace_discards_unmentioned_owner_fields() {
        let replaced = replace_update(existing(), owner_patch());
        assert_eq!(Value::Object(replaced.owner_info.fields), json!({"phone": "999"}));
    }

    #[test]
    fn omitted_sections_are_untouched_in_both_modes() {
        let before = existing();
        for mode in [UpdateMode::Merge, UpdateMode::Replace] {
            let after = apply(mode, before.clone(), owner_patch());
            assert_eq!(after.pet_info, before.pet_info);
            assert_eq!(after.id, before.id);
            assert_eq!(after.created_at, before.created_at);
            assert_eq!(after.updated_at, before.updated_at);
        }
    }

    #[test]
    fn merge_is_idempotent() {
        let patch = RecordPatch {
            owner_info: Some(fields(json!({"phone": "999", "email": "a@b.c"}))),
            pet_info: Some(fields(json!({"breed": "beagle"}))),
            pet_photo: Some(vec![7, 7]),
        };
        let once = merge_update(existing(), patch.clone());
        let twice = merge_update(once.clone(), patch);
        assert_eq!(twice.owner_info, once.owner_info);
        assert_eq!(twice.pet_info, once.pet_info);
    }

    #[test]
    fn merge_keeps_existing_photo_when_none_supplied() {
        let patch = RecordPatch {
            pet_info: Some(fields(json!({"breed": "beagle"}))),
            ..Default::default()
        };
        let merged = merge_update(existing(), patch);
        assert_eq!(merged.pet_info.pet_photo, Some(vec![1, 1, 1]));
        assert_eq!(merged.pet_info.fields["petName"], "Rex");
        assert_eq!(merged.pet_info.fields["breed"], "beagle");
    }

    #[test]
    fn replace_of_pet_info_drops_existing_photo() {
        let patch = RecordPatch {
            pet_info: Some(fields(json!({"petName": "Max"}))),
            ..Default::default()
        };
        let replaced = replace_update(existing(), patch);
        assert_eq!(replaced.pet_info.pet_photo, None);
        assert_eq!(Value::Object(replaced.pet_info.fields), json!({"petName": "Max"}));
    }

    #[test]
    fn supplied_photo_wins_with_or_without_pet_info() {
        for mode in [UpdateMode::Merge, UpdateMode::Replace] {
            let photo_only = RecordPatch {
                pet_photo: Some(vec![2]),
                ..Default::default()
            };
            let updated = apply(mode, existing(), photo_only);
            assert_eq!(updated.pet_info.pet_photo, Some(vec![2]));
            assert_eq!(updated.pet_info.fields["breed"], "lab");

            let with_pet = RecordPatch {
                pet_info: Some(fields(json!({"petName": "Max"}))),
                pet_photo: Some(vec![3]),
                ..Default::default()
            };
            let updated = apply(mode, existing(), with_pet);
            assert_eq!(updated.pet_info.pet_photo, Some(vec![3]));
        }
    }

    #[test]
    fn photo_key_in_pet_json_never_lands_in_fields() {
        let patch = RecordPatch {
            pet_info: Some(fields(json!({"petPhoto": "http://example.com/x.png"}))),
            ..Default::default()
        };
        let merged = merge_update(existing(), patch.clone());
        assert!(!merged.pet_info.fields.contains_key("petPhoto"));
        assert_eq!(merged.pet_info.pet_photo, Some(vec![1, 1, 1]));

        let replaced = replace_update(existing(), patch);
        assert!(replaced.pet_info.fields.is_empty());
    }

    #[test]
    fn replace_with_empty_section_clears_it() {
        let patch = RecordPatch {
            owner_info: Some(Fields::new()),
            ..Default::default()
        };
        let replaced = replace_update(existing(), patch);
        assert!(replaced.owner_info.fields.is_empty());
    }
}
