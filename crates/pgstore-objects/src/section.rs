use std::sync::Arc;

use tracing::debug;

use crate::error::{ObjectError, ObjectResult};
use crate::object::Object;

/// A failure recorded against a section or bundle instead of being returned.
pub type SectionError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// One named, independently produced artifact inside a bundle.
///
/// A section either holds the object it produced or the error that stopped
/// it from producing one (or both). The slot is kept either way.
#[derive(Clone, Debug)]
pub struct SectionObject {
    object: Option<Object>,
    object_type: String,
    name: String,
    code_id: String,
    code_type: String,
    section_index: usize,
    error: Option<SectionError>,
}

impl SectionObject {
    /// Fails with [`ObjectError::NilObject`] when there is neither an object
    /// nor an error to record.
    pub fn new(
        object: Option<Object>,
        object_type: impl Into<String>,
        name: impl Into<String>,
        code_id: impl Into<String>,
        code_type: impl Into<String>,
        section_index: usize,
        error: Option<SectionError>,
    ) -> ObjectResult<Self> {
        if object.is_none() && error.is_none() {
            return Err(ObjectError::NilObject);
        }
        Ok(Self {
            object,
            object_type: object_type.into(),
            name: name.into(),
            code_id: code_id.into(),
            code_type: code_type.into(),
            section_index,
            error,
        })
    }

    pub fn object(&self) -> Option<&Object> {
        self.object.as_ref()
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code_id(&self) -> &str {
        &self.code_id
    }

    pub fn code_type(&self) -> &str {
        &self.code_type
    }

    /// Position of this section within its source document.
    pub fn section_index(&self) -> usize {
        self.section_index
    }

    pub fn error(&self) -> Option<&SectionError> {
        self.error.as_ref()
    }

    /// Returns `true` if the section produced an object without error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Sections produced from a single source path, grouped for transfer.
///
/// Sections are only ever appended. The bundle may hold fewer sections than
/// `expected_count` while it is being assembled; whether it must be complete
/// is up to whoever consumes it.
///
/// Appending is not synchronized. Producers running in parallel should send
/// their results to one task that owns the bundle.
#[derive(Clone, Debug)]
pub struct MultiSectionsObject {
    path: String,
    sections: Vec<SectionObject>,
    expected_count: usize,
    error: Option<SectionError>,
}

impl MultiSectionsObject {
    pub fn new(path: impl Into<String>, expected_count: usize) -> Self {
        Self {
            path: path.into(),
            sections: Vec::new(),
            expected_count,
            error: None,
        }
    }

    /// Record a failure that affects the bundle as a whole.
    pub fn with_error(mut self, error: SectionError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn expected_count(&self) -> usize {
        self.expected_count
    }

    pub fn error(&self) -> Option<&SectionError> {
        self.error.as_ref()
    }

    /// Owned snapshot of the sections; changing it leaves the bundle untouched.
    pub fn section_objects(&self) -> Vec<SectionObject> {
        self.sections.clone()
    }

    /// Read-only view of the sections.
    pub fn sections(&self) -> &[SectionObject] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections that recorded an error.
    pub fn failed_sections(&self) -> impl Iterator<Item = &SectionObject> {
        self.sections.iter().filter(|s| !s.is_ok())
    }

    /// Objects produced so far, in section order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.sections.iter().filter_map(SectionObject::object)
    }

    /// Whether as many sections as expected have been appended.
    ///
    /// Informational only; appending past `expected_count` is allowed.
    pub fn is_complete(&self) -> bool {
        self.sections.len() == self.expected_count
    }

    pub fn add_section_object(&mut self, section: SectionObject) {
        debug!(
            path = %self.path,
            index = section.section_index,
            name = %section.name,
            failed = !section.is_ok(),
            "section added"
        );
        self.sections.push(section);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_section_object_with_params(
        &mut self,
        object: Option<Object>,
        object_type: impl Into<String>,
        name: impl Into<String>,
        code_id: impl Into<String>,
        code_type: impl Into<String>,
        section_index: usize,
        error: Option<SectionError>,
    ) -> ObjectResult<()> {
        let section = SectionObject::new(
            object,
            object_type,
            name,
            code_id,
            code_type,
            section_index,
            error,
        )?;
        self.add_section_object(section);
        Ok(())
    }
}
