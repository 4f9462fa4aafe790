use crate::infra::{InMemoryFormStore, LocalFileStorage};
use clap::Args;
use formdesk::error::AppError;
use formdesk::forms::{
    FormDefinition, FormError, FormPayload, FormService, FormView, RawUpload, RawValues,
    Submission, TenantId, TenantIdentity,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory for the demo attachment. Defaults to a fresh directory under the system temp dir.
    #[arg(long)]
    pub(crate) upload_dir: Option<PathBuf>,
    /// Skip the attachment portion of the demo.
    #[arg(long)]
    pub(crate) skip_attachment: bool,
    /// Print the rendered HTML of the demo form.
    #[arg(long)]
    pub(crate) show_html: bool,
}

type DemoService = FormService<InMemoryFormStore, LocalFileStorage>;

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        upload_dir,
        skip_attachment,
        show_html,
    } = args;

    let upload_dir = upload_dir.unwrap_or_else(|| {
        std::env::temp_dir().join(format!("formdesk-demo-{}", std::process::id()))
    });
    let service: DemoService = FormService::new(
        Arc::new(InMemoryFormStore::default()),
        Arc::new(LocalFileStorage::new(upload_dir)),
    );

    let acme = TenantIdentity {
        id: TenantId("acme".to_string()),
        company_name: "Acme Corp".to_string(),
    };
    let globex = TenantIdentity {
        id: TenantId("globex".to_string()),
        company_name: "Globex".to_string(),
    };

    println!("Formdesk demo");
    println!("=============");

    println!("\nRejected create (blank title)");
    match service.create_form(&acme, &FormPayload::default()) {
        Err(FormError::Validation(message)) => println!("- re-render with error: {message}"),
        Err(other) => return Err(other.into()),
        Ok(form) => println!("- unexpectedly created {}", form.id),
    }

    let survey = service.create_form(&acme, &survey_payload())?;
    print_form("Created form", &survey);
    if show_html {
        let action = format!("/api/v1/forms/{}/submissions", survey.id);
        println!("\n{}", FormView::from_definition(&survey).to_html(&action));
    }

    let raw_body = HashMap::from([
        ("email".to_string(), "a@b.com".to_string()),
        ("age".to_string(), "30".to_string()),
        ("spam".to_string(), "y".to_string()),
    ]);
    let submission = service.submit(&survey.id, &raw_body, None).await?;
    print_submission("Public submission (extra 'spam' key dropped)", &submission);

    println!("\nEdit attempt by {}", globex.company_name);
    let hijack = FormPayload {
        title: Some("Hijacked".to_string()),
        ..survey_payload()
    };
    match service.edit_form(&survey.id, &globex.id, &hijack) {
        Err(FormError::AccessDenied) => println!("- access refused"),
        Err(other) => return Err(other.into()),
        Ok(_) => println!("- unexpectedly accepted"),
    }

    if !skip_attachment {
        let edit = FormPayload {
            allow_file: Some("on".to_string()),
            field_name: Some(vec!["email", "age", "comments"].into()),
            field_type: Some(vec!["email", "number"].into()),
            ..survey_payload()
        };
        let updated = service.edit_form(&survey.id, &acme.id, &edit)?;
        print_form("Owner edit (attachments enabled)", &updated);

        let upload = RawUpload {
            file_name: Some("notes.txt".to_string()),
            content_type: Some("text/plain".to_string()),
            bytes: b"Thanks for the survey!".to_vec(),
        };
        let with_file = service
            .submit(&survey.id, &raw_body, Some(upload))
            .await?;
        print_submission("Submission with attachment", &with_file);
    }

    println!("\nPublic directory");
    for listing in service.list_public()? {
        println!(
            "- {} by {} ({} fields)",
            listing.title,
            listing.company_name.as_deref().unwrap_or("unknown company"),
            listing.field_count
        );
    }

    let submissions = service.submissions(&survey.id, &acme.id)?;
    println!(
        "\n{} sees {} submission(s) for '{}'",
        acme.company_name,
        submissions.len(),
        survey.title
    );

    Ok(())
}

fn survey_payload() -> FormPayload {
    FormPayload {
        title: Some("Survey".to_string()),
        field_name: Some(vec!["email", "age"].into()),
        field_type: Some(RawValues::from(vec!["email", "number"])),
        template: None,
        allow_file: None,
    }
}

fn print_form(heading: &str, form: &FormDefinition) {
    println!("\n{heading}");
    println!(
        "- {} [{}] template '{}', attachments {}",
        form.title,
        form.id,
        form.template,
        if form.allow_file { "on" } else { "off" }
    );
    for field in &form.fields {
        println!("  - {} ({})", field.name, field.field_type.label());
    }
}

fn print_submission(heading: &str, submission: &Submission) {
    println!("\n{heading}");
    for (name, value) in &submission.data {
        let shown = if value.is_empty() { "<empty>" } else { value.as_str() };
        println!("- {name}: {shown}");
    }
    if let Some(path) = &submission.file_path {
        println!("- attachment: {path}");
    }
}
