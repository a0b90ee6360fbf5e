// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operating modes shared by the settings source, the engine and the actuators.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Operating pipe profile a result (or a statistics record) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningMode {
    #[default]
    Video,
    VideoHdr,
    VideoHdr2,
    VideoUll,
    VideoLl,
    VideoHlc,
    StillCapture,
}

impl TuningMode {
    pub const ALL: [TuningMode; 7] = [
        TuningMode::Video,
        TuningMode::VideoHdr,
        TuningMode::VideoHdr2,
        TuningMode::VideoUll,
        TuningMode::VideoLl,
        TuningMode::VideoHlc,
        TuningMode::StillCapture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TuningMode::Video => "video",
            TuningMode::VideoHdr => "video_hdr",
            TuningMode::VideoHdr2 => "video_hdr2",
            TuningMode::VideoUll => "video_ull",
            TuningMode::VideoLl => "video_ll",
            TuningMode::VideoHlc => "video_hlc",
            TuningMode::StillCapture => "still_capture",
        }
    }

    /// HDR and ULL video pipes are mutually exclusive multi-frame capture classes:
    /// statistics captured under one cannot drive the other.
    pub fn conflicts_with(&self, other: TuningMode) -> bool {
        matches!(
            (self, other),
            (TuningMode::VideoUll, TuningMode::VideoHdr) | (TuningMode::VideoHdr, TuningMode::VideoUll)
        )
    }
}

impl fmt::Display for TuningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a mode name fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ModeParseError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for TuningMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        TuningMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == normalized)
            .ok_or(ModeParseError {
                kind: "tuning mode",
                value: s.to_string(),
            })
    }
}

/// Scene classification requested by the user or derived from the exposure result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneMode {
    #[default]
    Auto,
    Normal,
    Hdr,
    Ull,
    Hlc,
    Custom,
}

/// Multi-frame classification reported by the exposure solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketMode {
    #[default]
    None,
    Hdr,
    Ull,
}

/// Pipe class pushed back to the settings source after every computed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AecScene {
    Hdr,
    Ull,
}

impl AecScene {
    pub fn from_bracket(mode: BracketMode) -> Self {
        if mode == BracketMode::Ull {
            AecScene::Ull
        } else {
            AecScene::Hdr
        }
    }
}

/// Tone-map handling requested for the current iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TonemapMode {
    #[default]
    Fast,
    HighQuality,
    GammaValue,
    PresetCurve,
    ContrastCurve,
}

impl TonemapMode {
    /// Automatic modes leave the solver's tone curve untouched.
    pub fn is_automatic(&self) -> bool {
        matches!(self, TonemapMode::Fast | TonemapMode::HighQuality)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TonemapPresetCurve {
    #[default]
    Srgb,
    Rec709,
}

/// Whether and how auxiliary capture metadata is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MakernoteMode {
    #[default]
    Off,
    Jpeg,
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfMode {
    #[default]
    Off,
    Auto,
    ContinuousVideo,
    Manual,
}

/// Stream operation mode, resolved into the set of tuning modes a configuration needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    #[default]
    Normal,
    /// HDR and ULL pipes both configured, switched at runtime from the AE classification.
    AutoSwitch,
    Hdr,
    Ull,
    StillCapture,
}

impl OperationMode {
    pub fn tuning_modes(&self) -> Vec<TuningMode> {
        match self {
            OperationMode::Normal => vec![TuningMode::Video],
            OperationMode::AutoSwitch => vec![TuningMode::VideoHdr, TuningMode::VideoUll],
            OperationMode::Hdr => vec![TuningMode::VideoHdr],
            OperationMode::Ull => vec![TuningMode::VideoUll],
            OperationMode::StillCapture => vec![TuningMode::StillCapture],
        }
    }
}

/// Stream configuration passed to `configure`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub operation_mode: OperationMode,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_mode_parse_roundtrip() {
        for mode in TuningMode::ALL {
            assert_eq!(mode.as_str().parse::<TuningMode>().unwrap(), mode);
        }
        assert!("bogus".parse::<TuningMode>().is_err());
        assert_eq!(" VIDEO_HDR ".parse::<TuningMode>().unwrap(), TuningMode::VideoHdr);
    }

    #[test]
    fn test_hdr_ull_conflict_is_symmetric() {
        assert!(TuningMode::VideoHdr.conflicts_with(TuningMode::VideoUll));
        assert!(TuningMode::VideoUll.conflicts_with(TuningMode::VideoHdr));
        assert!(!TuningMode::Video.conflicts_with(TuningMode::VideoHdr));
        assert!(!TuningMode::VideoHdr.conflicts_with(TuningMode::VideoHdr));
    }

    #[test]
    fn test_aec_scene_from_bracket() {
        assert_eq!(AecScene::from_bracket(BracketMode::Ull), AecScene::Ull);
        assert_eq!(AecScene::from_bracket(BracketMode::Hdr), AecScene::Hdr);
        assert_eq!(AecScene::from_bracket(BracketMode::None), AecScene::Hdr);
    }

    #[test]
    fn test_auto_switch_configures_both_pipes() {
        let modes = OperationMode::AutoSwitch.tuning_modes();
        assert!(modes.contains(&TuningMode::VideoHdr));
        assert!(modes.contains(&TuningMode::VideoUll));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TuningMode::VideoUll).unwrap();
        assert_eq!(json, "\"video_ull\"");
    }
}
