//! Static catalogs shown by the emergency screens.
//!
//! None of these are user-editable. Severity on symptoms is descriptive only;
//! nothing in the workflow reads it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmergencyType {
    Medical,
    Fire,
    Police,
    Accident,
    Disaster,
    Other,
}

impl EmergencyType {
    pub const ALL: [Self; 6] = [
        Self::Medical,
        Self::Fire,
        Self::Police,
        Self::Accident,
        Self::Disaster,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Fire => "fire",
            Self::Police => "police",
            Self::Accident => "accident",
            Self::Disaster => "disaster",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Medical => "Medical Emergency",
            Self::Fire => "Fire Emergency",
            Self::Police => "Police/Security",
            Self::Accident => "Accident",
            Self::Disaster => "Natural Disaster",
            Self::Other => "Other Emergency",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Medical => "Injury, illness, or health crisis",
            Self::Fire => "Fire, smoke, or burns",
            Self::Police => "Crime, threat, or security",
            Self::Accident => "Vehicle or workplace accident",
            Self::Disaster => "Earthquake, flood, natural event",
            Self::Other => "Any urgent situation",
        }
    }

    /// Medical reports go through the body map; everything else uses the
    /// free-form report screen.
    #[must_use]
    pub const fn uses_body_map(self) -> bool {
        matches!(self, Self::Medical)
    }
}

impl fmt::Display for EmergencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyRegion {
    Head,
    Neck,
    UpperBody,
    Torso,
    Arms,
    LowerBody,
    Legs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyPart {
    Head,
    Eyes,
    Neck,
    LeftShoulder,
    RightShoulder,
    Chest,
    LeftArm,
    RightArm,
    Abdomen,
    LeftHand,
    RightHand,
    Pelvis,
    LeftThigh,
    RightThigh,
    LeftKnee,
    RightKnee,
    LeftFoot,
    RightFoot,
}

/// Where a body part sits on the body-map figure. `x`/`y` are percentages of
/// the figure's width/height, `size` is the relative hit-target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BodyPartInfo {
    pub part: BodyPart,
    pub name: &'static str,
    pub region: BodyRegion,
    pub x: u8,
    pub y: u8,
    pub size: u8,
}

const fn part(part: BodyPart, name: &'static str, region: BodyRegion, x: u8, y: u8, size: u8) -> BodyPartInfo {
    BodyPartInfo { part, name, region, x, y, size }
}

pub const BODY_PARTS: [BodyPartInfo; 18] = [
    part(BodyPart::Head, "Head/Skull", BodyRegion::Head, 50, 12, 8),
    part(BodyPart::Eyes, "Eyes", BodyRegion::Head, 50, 14, 3),
    part(BodyPart::Neck, "Neck", BodyRegion::Neck, 50, 20, 4),
    part(BodyPart::LeftShoulder, "Left Shoulder", BodyRegion::UpperBody, 35, 26, 5),
    part(BodyPart::RightShoulder, "Right Shoulder", BodyRegion::UpperBody, 65, 26, 5),
    part(BodyPart::Chest, "Chest", BodyRegion::Torso, 50, 32, 10),
    part(BodyPart::LeftArm, "Left Upper Arm", BodyRegion::Arms, 30, 35, 4),
    part(BodyPart::RightArm, "Right Upper Arm", BodyRegion::Arms, 70, 35, 4),
    part(BodyPart::Abdomen, "Abdomen", BodyRegion::Torso, 50, 45, 9),
    part(BodyPart::LeftHand, "Left Hand", BodyRegion::Arms, 20, 54, 3),
    part(BodyPart::RightHand, "Right Hand", BodyRegion::Arms, 80, 54, 3),
    part(BodyPart::Pelvis, "Pelvis/Hips", BodyRegion::LowerBody, 50, 55, 8),
    part(BodyPart::LeftThigh, "Left Thigh", BodyRegion::Legs, 43, 65, 5),
    part(BodyPart::RightThigh, "Right Thigh", BodyRegion::Legs, 57, 65, 5),
    part(BodyPart::LeftKnee, "Left Knee", BodyRegion::Legs, 42, 73, 3),
    part(BodyPart::RightKnee, "Right Knee", BodyRegion::Legs, 58, 73, 3),
    part(BodyPart::LeftFoot, "Left Foot", BodyRegion::Legs, 39, 94, 4),
    part(BodyPart::RightFoot, "Right Foot", BodyRegion::Legs, 61, 94, 4),
];

impl BodyPart {
    #[must_use]
    pub fn info(self) -> &'static BodyPartInfo {
        // BODY_PARTS is declared in variant order.
        &BODY_PARTS[self as usize]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.info().name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Symptom {
    SeverePain,
    Bleeding,
    Breathing,
    Unconscious,
    Burn,
    Fracture,
    ChestPain,
    Allergic,
}

impl Symptom {
    pub const ALL: [Self; 8] = [
        Self::SeverePain,
        Self::Bleeding,
        Self::Breathing,
        Self::Unconscious,
        Self::Burn,
        Self::Fracture,
        Self::ChestPain,
        Self::Allergic,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SeverePain => "Severe Pain",
            Self::Bleeding => "Bleeding",
            Self::Breathing => "Breathing Difficulty",
            Self::Unconscious => "Unconscious",
            Self::Burn => "Burn Injury",
            Self::Fracture => "Fracture/Break",
            Self::ChestPain => "Chest Pain",
            Self::Allergic => "Allergic Reaction",
        }
    }

    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::Breathing | Self::Unconscious | Self::ChestPain => Severity::Critical,
            Self::SeverePain | Self::Bleeding | Self::Burn | Self::Fracture | Self::Allergic => {
                Severity::High
            }
        }
    }
}
