use error_stack::{Context, Report};

/// Unpacks a [`figment::Error`] into printable attachments so a failed
/// configuration load says which key, from which source, went wrong.
pub trait AttachFigmentError<C: Context> {
    fn attach_figment_error(self, error: figment::Error) -> Report<C>;
}

impl<C: Context> AttachFigmentError<C> for Report<C> {
    fn attach_figment_error(self, error: figment::Error) -> Report<C> {
        let mut report = self.attach_printable(error.kind.to_string());

        if let (Some(profile), Some(metadata)) = (&error.profile, &error.metadata) {
            if !error.path.is_empty() {
                let key = metadata.interpolate(profile, &error.path);
                report = report.attach_printable(format!("for key {key:?}"));
            }
        }

        if let Some(metadata) = &error.metadata {
            report = match &metadata.source {
                Some(source) => {
                    report.attach_printable(format!("in {source} {}", metadata.name))
                }
                None => report.attach_printable(format!("in {}", metadata.name)),
            };
        }

        report
    }
}
