//! Field table for the bundled N-400 (Application for Naturalization)
//! template. Bump `revision` and re-read the field names whenever the
//! template file is replaced.

use super::mapping::{FieldBinding, FormTable};
use super::record::Attribute;

pub static N400: FormTable = FormTable {
    form_id: "N-400",
    revision: 1,
    bindings: N400_BINDINGS,
};

/// The A-number is repeated in the header area of every page section.
pub const N400_ALIEN_NUMBER_TARGETS: &[&str] = &[
    "form1[0].#subform[0].#area[0].Line1_AlienNumber[0]",
    "form1[0].#subform[1].#area[1].Line1_AlienNumber[1]",
    "form1[0].#subform[2].#area[2].Line1_AlienNumber[2]",
    "form1[0].#subform[3].#area[3].Line1_AlienNumber[3]",
    "form1[0].#subform[4].#area[4].Line1_AlienNumber[4]",
    "form1[0].#subform[5].#area[6].Line1_AlienNumber[5]",
    "form1[0].#subform[6].#area[7].Line1_AlienNumber[6]",
    "form1[0].#subform[7].#area[8].Line1_AlienNumber[7]",
    "form1[0].#subform[8].#area[9].Line1_AlienNumber[8]",
    "form1[0].#subform[9].#area[10].Line1_AlienNumber[9]",
    "form1[0].#subform[10].#area[11].Line1_AlienNumber[10]",
    "form1[0].#subform[11].#area[12].Line1_AlienNumber[11]",
    "form1[0].#subform[12].#area[13].Line1_AlienNumber[12]",
    "form1[0].#subform[13].#area[14].Line1_AlienNumber[13]",
];

const N400_BINDINGS: &[FieldBinding] = &[
    // Part 2: applicant information
    FieldBinding {
        attribute: Attribute::LastName,
        targets: &["form1[0].#subform[1].Part2Line3_FamilyName[0]"],
    },
    FieldBinding {
        attribute: Attribute::FirstName,
        targets: &["form1[0].#subform[1].Part2Line4a_GivenName[0]"],
    },
    FieldBinding {
        attribute: Attribute::MiddleName,
        targets: &["form1[0].#subform[1].Part2Line4a_MiddleName[0]"],
    },
    FieldBinding {
        attribute: Attribute::FormattedDateOfBirth,
        targets: &["form1[0].#subform[1].P2_Line8_DateOfBirth[0]"],
    },
    FieldBinding {
        attribute: Attribute::FormattedDateBecamePermanentResident,
        targets: &["form1[0].#subform[1].P2_Line9_DateBecamePermanentResident[0]"],
    },
    FieldBinding {
        attribute: Attribute::CountryOfBirth,
        targets: &["form1[0].#subform[1].P2_Line10_CountryOfBirth[0]"],
    },
    FieldBinding {
        attribute: Attribute::Citizenship,
        targets: &["form1[0].#subform[1].P2_Line11_CountryOfNationality[0]"],
    },
    FieldBinding {
        attribute: Attribute::UscisAccountNumber,
        targets: &["form1[0].#subform[1].P2_Line6_USCISELISAcctNumber[0]"],
    },
    FieldBinding {
        attribute: Attribute::Ssn,
        targets: &["form1[0].#subform[8].P9_Line22c_SSNumber[0]"],
    },
    // Part 4: physical address
    FieldBinding {
        attribute: Attribute::AddressNumber,
        targets: &["form1[0].#subform[2].P4_Line1_Number[0]"],
    },
    FieldBinding {
        attribute: Attribute::AddressStreet,
        targets: &["form1[0].#subform[2].P4_Line1_StreetName[0]"],
    },
    FieldBinding {
        attribute: Attribute::City,
        targets: &["form1[0].#subform[2].P4_Line1_City[0]"],
    },
    FieldBinding {
        attribute: Attribute::State,
        targets: &["form1[0].#subform[2].P4_Line1_State[0]"],
    },
    FieldBinding {
        attribute: Attribute::ZipCode,
        targets: &["form1[0].#subform[2].P4_Line1_ZipCode[0]"],
    },
    FieldBinding {
        attribute: Attribute::Country,
        targets: &["form1[0].#subform[2].P4_Line1_Country[0]"],
    },
    // Part 12: contact information
    FieldBinding {
        attribute: Attribute::Phone,
        targets: &["form1[0].#subform[10].P12_Line3_Telephone[0]"],
    },
    FieldBinding {
        attribute: Attribute::Email,
        targets: &["form1[0].#subform[10].P12_Line5_Email[0]"],
    },
    FieldBinding {
        attribute: Attribute::AlienNumber,
        targets: N400_ALIEN_NUMBER_TARGETS,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn binds_every_recognized_attribute_once() {
        let bound: HashSet<Attribute> = N400.bindings.iter().map(|b| b.attribute).collect();
        assert_eq!(bound.len(), N400.bindings.len());
        assert_eq!(bound.len(), Attribute::ALL.len());
    }

    #[test]
    fn targets_are_distinct() {
        let targets: Vec<&str> = N400.targets().collect();
        let unique: HashSet<&str> = targets.iter().copied().collect();
        assert_eq!(targets.len(), unique.len());
        assert_eq!(targets.len(), 17 + 14);
    }

    #[test]
    fn alien_number_is_the_only_fan_out() {
        for binding in N400.bindings {
            let expected = if binding.attribute == Attribute::AlienNumber {
                14
            } else {
                1
            };
            assert_eq!(binding.targets.len(), expected, "{:?}", binding.attribute);
        }
    }
}
