//! Project and toolchain detection
//!
//! Runs in two phases:
//! 1. Analyze an existing runtime-init artifact: score the family
//!    signatures and read the mode header.
//! 2. Otherwise scan the source directory for an entry file or an
//!    always-compile file.
//!
//! Detection itself never writes; the orchestrator acts on the returned
//! [`Detection`].

mod exclude;

pub use exclude::{ExcludeError, ScanExcludes};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;
use wasmlane_classifier::ClassifierConfig;

use crate::config::LaneConfig;
use crate::mode::{ModeKind, ModeRegistry};
use crate::script::read_header;
use crate::toolchain::{DetectionSignatures, ToolchainFamily};

/// Signature occurrence counts per family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignatureScore {
    pub standard: usize,
    pub secondary: usize,
}

impl SignatureScore {
    /// Winning family, if any.
    ///
    /// The strictly greater count wins; a one-sided match always wins.
    /// Ties (including 0-0) decide nothing.
    pub fn winner(&self) -> Option<ToolchainFamily> {
        use std::cmp::Ordering;
        match self.standard.cmp(&self.secondary) {
            Ordering::Greater => Some(ToolchainFamily::Standard),
            Ordering::Less => Some(ToolchainFamily::Secondary),
            Ordering::Equal => None,
        }
    }
}

/// Count every occurrence of each family's signatures in `content`
pub fn score_signatures(content: &str, signatures: &DetectionSignatures) -> SignatureScore {
    let count = |list: &[String]| -> usize {
        list.iter()
            .filter(|s| !s.is_empty())
            .map(|s| content.matches(s.as_str()).count())
            .sum()
    };
    SignatureScore {
        standard: count(&signatures.standard),
        secondary: count(&signatures.secondary),
    }
}

/// Result of analyzing artifact content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactAnalysis {
    pub score: SignatureScore,
    /// Raw header token, if a header line was present
    pub header_token: Option<String>,
    /// Mode named by a header token that validates
    pub header_mode: Option<ModeKind>,
    pub family: Option<ToolchainFamily>,
    pub mode: Option<ModeKind>,
}

impl ArtifactAnalysis {
    pub fn is_decided(&self) -> bool {
        self.mode.is_some()
    }
}

/// Analyze runtime-init artifact content
pub fn analyze_artifact(
    content: &str,
    marker: &str,
    signatures: &DetectionSignatures,
    registry: &ModeRegistry,
) -> ArtifactAnalysis {
    let score = score_signatures(content, signatures);
    let header_token = read_header(marker, content);
    let header_mode = header_token
        .as_deref()
        .and_then(|token| registry.resolve(token).ok())
        .map(|mode| mode.kind);

    let (family, mode) = match (score.winner(), header_mode) {
        (Some(family), Some(kind)) => (Some(family), Some(kind)),
        (Some(family), None) => (Some(family), Some(ModeKind::default_for(family))),
        (None, Some(kind)) => (Some(kind.family()), Some(kind)),
        (None, None) => (None, None),
    };

    ArtifactAnalysis {
        score,
        header_token,
        header_mode,
        family,
        mode,
    }
}

/// First file in `source_dir` the classifier deems relevant.
///
/// Entries are visited sorted by file name; excluded paths are pruned.
/// A missing directory yields `None`.
pub fn scan_sources(
    source_dir: &Path,
    classifier: &ClassifierConfig,
    excludes: &ScanExcludes,
) -> Option<PathBuf> {
    if !source_dir.is_dir() {
        return None;
    }

    let walker = WalkDir::new(source_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let relative = entry.path().strip_prefix(source_dir).unwrap_or(entry.path());
            relative.as_os_str().is_empty() || !excludes.is_excluded(relative)
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relevant = {
            let name = entry.file_name().to_string_lossy();
            let path = entry.path().to_string_lossy();
            wasmlane_classifier::classify(&name, &path, classifier).relevant
        };
        if relevant {
            return Some(entry.into_path());
        }
    }
    None
}

/// Which phase produced the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionPhase {
    Artifact,
    SourceScan,
    None,
}

/// Detection report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub phase: DetectionPhase,
    pub family: Option<ToolchainFamily>,
    pub mode: Option<ModeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_mode: Option<ModeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<SignatureScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_path: Option<PathBuf>,
}

impl Detection {
    fn none(score: Option<SignatureScore>) -> Self {
        Self {
            phase: DetectionPhase::None,
            family: None,
            mode: None,
            header_mode: None,
            score,
            matched_path: None,
        }
    }

    pub fn is_target_project(&self) -> bool {
        self.phase != DetectionPhase::None
    }
}

/// One-shot project detector
#[derive(Debug, Clone)]
pub struct Detector {
    artifact_path: PathBuf,
    source_dir: PathBuf,
    marker: String,
    signatures: DetectionSignatures,
    classifier: ClassifierConfig,
    excludes: ScanExcludes,
}

impl Detector {
    pub fn new(root: &Path, config: &LaneConfig) -> Result<Self, ExcludeError> {
        Ok(Self {
            artifact_path: config.init_script_path(root),
            source_dir: config.source_path(root),
            marker: config.header_marker.clone(),
            signatures: config.signatures.clone(),
            classifier: config.classifier_config(),
            excludes: ScanExcludes::new(config.scan_exclude.as_slice())?,
        })
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Run both phases
    pub fn detect(&self, registry: &ModeRegistry) -> Detection {
        let mut inconclusive_score = None;

        if self.artifact_path.is_file() {
            match fs::read(&self.artifact_path) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    let analysis =
                        analyze_artifact(&content, &self.marker, &self.signatures, registry);
                    debug!(
                        standard = analysis.score.standard,
                        secondary = analysis.score.secondary,
                        header = ?analysis.header_token,
                        "analyzed runtime-init artifact"
                    );
                    if analysis.is_decided() {
                        return Detection {
                            phase: DetectionPhase::Artifact,
                            family: analysis.family,
                            mode: analysis.mode,
                            header_mode: analysis.header_mode,
                            score: Some(analysis.score),
                            matched_path: Some(self.artifact_path.clone()),
                        };
                    }
                    inconclusive_score = Some(analysis.score);
                }
                Err(e) => {
                    warn!(path = %self.artifact_path.display(), error = %e, "cannot read runtime-init artifact");
                }
            }
        }

        if let Some(path) = scan_sources(&self.source_dir, &self.classifier, &self.excludes) {
            debug!(path = %path.display(), "found source entry");
            return Detection {
                phase: DetectionPhase::SourceScan,
                family: Some(ToolchainFamily::Standard),
                mode: Some(ModeKind::Large),
                header_mode: None,
                score: inconclusive_score,
                matched_path: Some(path),
            };
        }

        Detection::none(inconclusive_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigs() -> DetectionSignatures {
        DetectionSignatures::default()
    }

    #[test]
    fn test_winner_rules() {
        let score = |standard, secondary| SignatureScore { standard, secondary };
        assert_eq!(score(3, 1).winner(), Some(ToolchainFamily::Standard));
        assert_eq!(score(1, 4).winner(), Some(ToolchainFamily::Secondary));
        assert_eq!(score(0, 1).winner(), Some(ToolchainFamily::Secondary));
        assert_eq!(score(0, 0).winner(), None);
        assert_eq!(score(2, 2).winner(), None);
    }

    #[test]
    fn test_score_counts_every_occurrence() {
        let content = "runtime.wasmExit runtime.wasmExit fd_write";
        let score = score_signatures(content, &sigs());
        assert_eq!(score, SignatureScore { standard: 2, secondary: 1 });
    }

    #[test]
    fn test_score_is_order_independent() {
        let a = score_signatures("runtime.ticks\nruntime.nanotime1\nfd_write", &sigs());
        let b = score_signatures("fd_write\nruntime.nanotime1\nruntime.ticks", &sigs());
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_signature_ignored() {
        let signatures = DetectionSignatures {
            standard: vec![String::new()],
            secondary: vec!["fd_write".to_string()],
        };
        let score = score_signatures("fd_write", &signatures);
        assert_eq!(score.standard, 0);
    }

    #[test]
    fn test_analyze_family_default_mode() {
        let registry = ModeRegistry::default();
        let analysis = analyze_artifact("runtime.ticks", "// wasmlane", &sigs(), &registry);
        assert_eq!(analysis.family, Some(ToolchainFamily::Secondary));
        assert_eq!(analysis.mode, Some(ModeKind::Medium));
    }

    #[test]
    fn test_analyze_header_overrides_default() {
        let registry = ModeRegistry::default();
        let content = "// wasmlane: mode=S\nruntime.ticks\nfd_write\n";
        let analysis = analyze_artifact(content, "// wasmlane", &sigs(), &registry);
        assert_eq!(analysis.mode, Some(ModeKind::Small));
        assert_eq!(analysis.header_mode, Some(ModeKind::Small));
    }

    #[test]
    fn test_analyze_invalid_header_falls_back() {
        let registry = ModeRegistry::default();
        let content = "// wasmlane: mode=Q\nruntime.wasmExit\n";
        let analysis = analyze_artifact(content, "// wasmlane", &sigs(), &registry);
        assert_eq!(analysis.header_token.as_deref(), Some("Q"));
        assert_eq!(analysis.header_mode, None);
        assert_eq!(analysis.mode, Some(ModeKind::Large));
    }

    #[test]
    fn test_analyze_header_token_is_normalized() {
        let registry = ModeRegistry::default();
        let content = "// wasmlane: mode=s\nruntime.ticks\n";
        let analysis = analyze_artifact(content, "// wasmlane", &sigs(), &registry);
        assert_eq!(analysis.header_token.as_deref(), Some("s"));
        assert_eq!(analysis.header_mode, Some(ModeKind::Small));
        assert_eq!(analysis.mode, Some(ModeKind::Small));
    }

    #[test]
    fn test_analyze_header_alone_decides() {
        let registry = ModeRegistry::default();
        let analysis = analyze_artifact("// wasmlane: mode=M\n", "// wasmlane", &sigs(), &registry);
        assert_eq!(analysis.family, Some(ToolchainFamily::Secondary));
        assert_eq!(analysis.mode, Some(ModeKind::Medium));
    }

    #[test]
    fn test_analyze_tie_without_header_is_undecided() {
        let registry = ModeRegistry::default();
        let analysis = analyze_artifact("runtime.ticks runtime.wasmExit", "// wasmlane", &sigs(), &registry);
        assert!(!analysis.is_decided());
    }

    #[test]
    fn test_scan_sources_prunes_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let hidden = dir.path().join("node_modules").join("pkg");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("main.go"), "package main").unwrap();

        let excludes = ScanExcludes::new::<&str>(&[]).unwrap();
        let config = ClassifierConfig::default();
        assert_eq!(scan_sources(dir.path(), &config, &excludes), None);

        let module = dir.path().join("modules").join("ui");
        fs::create_dir_all(&module).unwrap();
        fs::write(module.join("ui.wasm.go"), "package ui").unwrap();
        assert_eq!(
            scan_sources(dir.path(), &config, &excludes),
            Some(module.join("ui.wasm.go"))
        );
    }

    #[test]
    fn test_scan_missing_dir() {
        let excludes = ScanExcludes::new::<&str>(&[]).unwrap();
        let missing = Path::new("/nonexistent/wasmlane/web");
        assert_eq!(scan_sources(missing, &ClassifierConfig::default(), &excludes), None);
    }

    #[test]
    fn test_detector_phases() {
        let dir = tempfile::tempdir().unwrap();
        let config = LaneConfig::default();
        let registry = ModeRegistry::default();
        let detector = Detector::new(dir.path(), &config).unwrap();

        assert_eq!(detector.detect(&registry).phase, DetectionPhase::None);

        fs::create_dir_all(dir.path().join("web")).unwrap();
        fs::write(dir.path().join("web").join("main.go"), "package main").unwrap();
        let detection = detector.detect(&registry);
        assert_eq!(detection.phase, DetectionPhase::SourceScan);
        assert_eq!(detection.mode, Some(ModeKind::Large));

        let artifact = config.init_script_path(dir.path());
        fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        fs::write(&artifact, "// wasmlane: mode=S\nruntime.ticks\n").unwrap();
        let detection = detector.detect(&registry);
        assert_eq!(detection.phase, DetectionPhase::Artifact);
        assert_eq!(detection.mode, Some(ModeKind::Small));
    }

    #[test]
    fn test_detector_reads_non_utf8_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = LaneConfig::default();
        let registry = ModeRegistry::default();
        let detector = Detector::new(dir.path(), &config).unwrap();

        fs::create_dir_all(dir.path().join("web")).unwrap();
        fs::write(dir.path().join("web").join("main.go"), "package main").unwrap();
        let artifact = config.init_script_path(dir.path());
        fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        fs::write(&artifact, b"// wasmlane: mode=S\nruntime.ticks\n// caf\xe9\n").unwrap();

        let detection = detector.detect(&registry);
        assert_eq!(detection.phase, DetectionPhase::Artifact);
        assert_eq!(detection.mode, Some(ModeKind::Small));
    }

    #[test]
    fn test_detection_serializes() {
        let json = serde_json::to_value(Detection::none(None)).unwrap();
        assert_eq!(json["phase"], "none");
        assert!(json.get("score").is_none());
    }
}
