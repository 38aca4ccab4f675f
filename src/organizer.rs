/// End-to-end organize flow: scan, classify, plan and optionally apply.
///
/// The pieces are usable on their own (`scan`, `plan`, `executor`); this
/// module wires them together with the user's settings the way the command
/// line front-end needs them.
use crate::classify::{ClassificationRequest, Classifier};
use crate::config::{CompiledFilters, Config, OrganizerSettings};
use crate::error::OrganizeResult;
use crate::executor::{ApplyReport, apply_plan};
use crate::logging::LogSink;
use crate::plan::{ClassificationEntry, MovePlan, build_plan};
use crate::scan::collect_candidates;
use std::path::Path;

/// A classification and the plan derived from it, ready for review.
#[derive(Debug, Clone)]
pub struct Preview {
    pub classified: Vec<ClassificationEntry>,
    pub plan: MovePlan,
}

/// Organizes folders according to one set of settings and filters.
pub struct Organizer {
    settings: OrganizerSettings,
    filters: CompiledFilters,
}

impl Organizer {
    pub fn new(settings: OrganizerSettings, filters: CompiledFilters) -> Self {
        Self { settings, filters }
    }

    /// Builds an organizer from a loaded configuration, compiling its filters.
    pub fn from_config(config: &Config) -> OrganizeResult<Self> {
        Ok(Self::new(config.organizer.clone(), config.compile_filters()?))
    }

    pub fn settings(&self) -> &OrganizerSettings {
        &self.settings
    }

    /// Collects the candidate files of `folder` and describes them for the
    /// classifier.
    pub fn request(
        &self,
        folder: &Path,
        sink: &dyn LogSink,
    ) -> OrganizeResult<ClassificationRequest> {
        sink.info("Preparing data for classification...");
        let files = collect_candidates(folder, &self.filters, sink)?;

        Ok(ClassificationRequest::new(
            &files,
            &self.settings.categories,
            &self.settings.context,
            self.settings.allow_skip,
            self.settings.mode,
        ))
    }

    /// Asks `classifier` to sort the candidate files of `folder`. Does not
    /// move anything.
    pub fn classify(
        &self,
        folder: &Path,
        classifier: &dyn Classifier,
        sink: &dyn LogSink,
    ) -> OrganizeResult<Vec<ClassificationEntry>> {
        let request = self.request(folder, sink)?;
        if request.is_empty() {
            sink.info("No files to classify in the selected folder.");
            return Ok(Vec::new());
        }

        sink.info(&format!("Found {} files to classify.", request.files.len()));
        Ok(classifier.classify(&request, sink))
    }

    /// Classifies `folder` and plans the moves without touching the disk.
    pub fn preview(
        &self,
        folder: &Path,
        classifier: &dyn Classifier,
        sink: &dyn LogSink,
    ) -> OrganizeResult<Preview> {
        let classified = self.classify(folder, classifier, sink)?;
        let plan = build_plan(folder, &classified, self.settings.allow_skip, sink);
        Ok(Preview { classified, plan })
    }

    /// Classifies, plans and applies in one go.
    ///
    /// An empty classification leaves the folder and its journal untouched.
    pub fn organize(
        &self,
        folder: &Path,
        classifier: &dyn Classifier,
        sink: &dyn LogSink,
    ) -> OrganizeResult<ApplyReport> {
        sink.info("Starting organization...");
        let preview = self.preview(folder, classifier, sink)?;
        if preview.classified.is_empty() {
            sink.info("No classification results. Nothing to move.");
            return Ok(ApplyReport::default());
        }

        apply_plan(folder, &preview.plan, sink)
    }
}
