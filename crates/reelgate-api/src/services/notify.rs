//! Best-effort notification fan-out.
//!
//! Every send here happens after the review outcome is committed and must
//! never affect it: failures are logged and swallowed.

use reelgate_core::{Config, Upload};
use tokio::sync::mpsc;

use crate::services::discord::{DiscordService, Embed, EmbedField, EmbedFooter};
use crate::services::email::EmailService;

const COLOR_RECEIVED: u32 = 6147277;
const COLOR_APPROVED: u32 = 5025616;
const COLOR_DENIED: u32 = 15220031;

/// Which fan-out fired. Emitted on the observation channel regardless of
/// whether any delivery channel is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyEvent {
    Received,
    Approved,
    Denied,
}

#[derive(Clone)]
pub struct Notifier {
    email: Option<EmailService>,
    discord: Option<DiscordService>,
    app_name: String,
    app_url: String,
    admin_emails: Vec<String>,
    events: Option<mpsc::UnboundedSender<NotifyEvent>>,
}

impl Notifier {
    pub fn from_config(config: &Config) -> Self {
        Self {
            email: EmailService::from_config(config),
            discord: DiscordService::from_config(config),
            app_name: config.app_name.clone(),
            app_url: config.app_url.clone(),
            admin_emails: config.admin_emails.clone(),
            events: None,
        }
    }

    /// A notifier with every channel turned off.
    pub fn disabled() -> Self {
        Self {
            email: None,
            discord: None,
            app_name: String::new(),
            app_url: String::new(),
            admin_emails: Vec::new(),
            events: None,
        }
    }

    /// A disabled notifier that reports each dispatch on a channel, so
    /// tests can assert which notifications a workflow triggered.
    pub fn observed() -> (Self, mpsc::UnboundedReceiver<NotifyEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut notifier = Self::disabled();
        notifier.events = Some(tx);
        (notifier, rx)
    }

    fn emit(&self, event: NotifyEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    /// New upload landed in the review queue: confirm to the uploader,
    /// alert the admins with a review link, post to Discord.
    pub async fn upload_received(&self, upload: &Upload) {
        self.emit(NotifyEvent::Received);
        let type_display = upload.media_type.display_name();

        self.send_email(
            std::slice::from_ref(&upload.uploader),
            &format!("Upload received - {}", self.app_name),
            &format!(
                "Your upload was received and is awaiting review.\n\n\
                 File: {}\nType: {}\n\n\
                 You will get another email once it has been reviewed.",
                upload.original_name, type_display
            ),
        )
        .await;

        self.send_email(
            &self.admin_emails,
            &format!("New upload pending - {}", upload.original_name),
            &format!(
                "A new upload is waiting for review.\n\n\
                 File: {}\nType: {}\nUploader: {}\n\n\
                 Review at {}/admin",
                upload.original_name, type_display, upload.uploader, self.app_url
            ),
        )
        .await;

        self.send_discord(Embed {
            title: format!("New Upload - {}", self.app_name),
            color: COLOR_RECEIVED,
            fields: vec![
                field("File", &upload.original_name, false),
                field("Type", type_display, true),
                field("Uploader", &upload.uploader, true),
            ],
            footer: Some(EmbedFooter {
                text: format!("Review at {}/admin", self.app_url),
            }),
        })
        .await;
    }

    pub async fn upload_approved(&self, upload: &Upload) {
        self.emit(NotifyEvent::Approved);
        let type_display = upload.media_type.display_name();

        self.send_email(
            std::slice::from_ref(&upload.uploader),
            &format!("Upload approved - {}", self.app_name),
            &format!(
                "Good news, your upload was approved and is now available on Plex.\n\n\
                 File: {}\nAdded to: {} library",
                upload.original_name, type_display
            ),
        )
        .await;

        self.send_discord(Embed {
            title: "Upload Approved".to_string(),
            color: COLOR_APPROVED,
            fields: vec![
                field("File", &upload.original_name, false),
                field("Added to", &format!("Plex {} library", type_display), true),
            ],
            footer: None,
        })
        .await;
    }

    pub async fn upload_denied(&self, upload: &Upload) {
        self.emit(NotifyEvent::Denied);
        let notes_text = upload
            .review_notes
            .as_deref()
            .map(|n| format!("\nNotes: {}", n))
            .unwrap_or_default();

        self.send_email(
            std::slice::from_ref(&upload.uploader),
            &format!("Upload not approved - {}", self.app_name),
            &format!(
                "Your upload was not approved.\n\nFile: {}{}",
                upload.original_name, notes_text
            ),
        )
        .await;

        let mut fields = vec![field("File", &upload.original_name, false)];
        if let Some(notes) = upload.review_notes.as_deref() {
            fields.push(field("Notes", notes, false));
        }
        self.send_discord(Embed {
            title: "Upload Denied".to_string(),
            color: COLOR_DENIED,
            fields,
            footer: None,
        })
        .await;
    }

    async fn send_email(&self, to: &[String], subject: &str, body: &str) {
        let Some(email) = &self.email else { return };
        if let Err(err) = email.send(to, subject, body).await {
            tracing::warn!(error = %err, subject = %subject, "Failed to send notification email");
        }
    }

    async fn send_discord(&self, embed: Embed) {
        let Some(discord) = &self.discord else { return };
        if let Err(err) = discord.send(&embed).await {
            tracing::warn!(error = %err, "Failed to send Discord notification");
        }
    }
}

fn field(name: &str, value: &str, inline: bool) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: value.to_string(),
        inline,
    }
}
