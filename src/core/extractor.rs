//! Version extraction
//!
//! `extract` never fails outright: every problem is folded into an
//! `ExtractionOutcome::Failure` carrying a readable reason.

use std::fmt::Display;
use std::fs;
use std::path::Path;

use crate::models::module::{
    ExtractionMode, ExtractionOutcome, FailureKind, ModuleReference, VersionDescriptor,
    UNKNOWN_VERSION,
};
use crate::parsers::{read_assembly_identity, read_version_resource, PeImage, VersionStrings};

/// Determine the version of the module at `module_path` using `mode`
pub fn extract(module_path: &Path, mode: ExtractionMode) -> ExtractionOutcome {
    let module = ModuleReference::resolve(module_path);
    if !module.exists {
        return ExtractionOutcome::failure(
            FailureKind::NotFound,
            format!("Error: File not found: {}", module_path.display()),
        );
    }

    match mode {
        ExtractionMode::Managed => extract_managed(&module),
        ExtractionMode::Native => extract_native(&module),
    }
}

fn extract_managed(module: &ModuleReference) -> ExtractionOutcome {
    let data = match fs::read(&module.path) {
        Ok(data) => data,
        Err(err) => return exception(FailureKind::Unreadable, "Assembly", module, err),
    };

    match PeImage::parse(&data).and_then(|image| read_assembly_identity(&image)) {
        Ok(identity) => {
            let version = identity.version_string();
            ExtractionOutcome::Success(VersionDescriptor::new(identity.name, version))
        }
        Err(err) => exception(FailureKind::Unparsable, "Assembly", module, err),
    }
}

fn extract_native(module: &ModuleReference) -> ExtractionOutcome {
    let data = match fs::read(&module.path) {
        Ok(data) => data,
        Err(err) => return exception(FailureKind::Unreadable, "Version", module, err),
    };

    // Files without a usable version resource report empty fields, not an error
    let strings = PeImage::parse(&data)
        .and_then(|image| read_version_resource(&image))
        .ok()
        .flatten()
        .unwrap_or_default();

    ExtractionOutcome::Success(native_descriptor(&strings, module))
}

fn native_descriptor(strings: &VersionStrings, module: &ModuleReference) -> VersionDescriptor {
    let name = strings
        .file_description()
        .or_else(|| strings.internal_name())
        .or_else(|| strings.original_filename())
        .map(str::to_string)
        .unwrap_or_else(|| module.file_name());

    let version = strings
        .file_version()
        .or_else(|| strings.product_version())
        .unwrap_or(UNKNOWN_VERSION);

    VersionDescriptor::new(name, version)
}

fn exception(
    kind: FailureKind,
    what: &str,
    module: &ModuleReference,
    err: impl Display,
) -> ExtractionOutcome {
    ExtractionOutcome::failure(
        kind,
        format!(
            "Exception determining {} info for {}: {}",
            what,
            module.file_name(),
            err
        ),
    )
}
