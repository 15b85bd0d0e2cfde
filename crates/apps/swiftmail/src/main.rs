//! SwiftMail - disposable mailboxes from the terminal
//!
//! Thin command-line front-end over the mailbox crate: provisions and
//! restores identities, watches the inbox, and manages the auto-purge
//! retention window.

use anyhow::{Context, Result, bail};
use chrono::Duration;
use log::info;
use std::io::{BufRead, Write};
use std::sync::Arc;

use mailbox::{
    ConfirmationGate, DEFAULT_POLL_INTERVAL, FileIdentityStore, LifecycleController, MailTm,
    MessageId, RetentionPolicy, Session, Synchronizer, start_poller,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let dir = config::init().context("Failed to initialize config directory")?;
    info!("using config dir {}", dir.display());

    let app = App::new()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("status") => app.status(),
        Some("new") => app.new_identity(),
        Some("restore") => match (args.get(1), args.get(2)) {
            (Some(address), Some(password)) => app.restore(address, password),
            _ => bail!("usage: swiftmail restore <address> <password>"),
        },
        Some("watch") => app.watch(),
        Some("purge") => app.purge(&args[1..]),
        Some("read") => match args.get(1) {
            Some(id) => app.read(id),
            None => bail!("usage: swiftmail read <message-id>"),
        },
        Some("delete") => match args.get(1) {
            Some(id) => app.delete(id),
            None => bail!("usage: swiftmail delete <message-id>"),
        },
        Some("help") => {
            usage();
            Ok(())
        }
        Some(other) => {
            usage();
            bail!("unknown command: {other}");
        }
    }
}

fn usage() {
    println!(
        "swiftmail - disposable mailboxes from the terminal\n\n\
         commands:\n\
         \x20 status                       show the active identity\n\
         \x20 new                          provision a fresh identity (retires the current one)\n\
         \x20 restore <address> <password> re-adopt an existing mailbox\n\
         \x20 watch                        poll the inbox; Enter lists, q quits\n\
         \x20 purge [on <hours> | off]     show or set the auto-purge window\n\
         \x20 read <message-id>            show full message content\n\
         \x20 delete <message-id>          delete one message (asks first)"
    );
}

struct App {
    session: Arc<Session>,
    sync: Arc<Synchronizer>,
    lifecycle: Arc<LifecycleController>,
    gate: ConfirmationGate,
}

impl App {
    fn new() -> Result<Self> {
        let remote = Arc::new(MailTm::new());
        let session = Arc::new(Session::new());
        let store = Arc::new(FileIdentityStore::new()?);

        let sync = Arc::new(Synchronizer::new(remote.clone(), session.clone()));
        let lifecycle = Arc::new(LifecycleController::new(remote, session.clone(), store));

        // Pick up the identity and retention policy from the last run
        lifecycle.bootstrap()?;

        Ok(Self {
            session,
            sync,
            lifecycle,
            gate: ConfirmationGate::new(),
        })
    }

    fn status(&self) -> Result<()> {
        let Some(identity) = self.session.identity() else {
            println!("no active identity; run `swiftmail new`");
            return Ok(());
        };

        println!("address:  {}", identity.address);
        println!("password: {}", identity.password);
        println!("quota:    {} / {} bytes", identity.used, identity.quota);

        let policy = self.session.policy();
        if policy.enabled {
            println!("purge:    on, {} h window", policy.window.num_hours());
        } else {
            println!("purge:    off");
        }
        Ok(())
    }

    fn new_identity(&self) -> Result<()> {
        if self.session.has_identity() {
            self.lifecycle.request_retire(&self.gate);
            if !self.prompt_pending()? {
                self.gate.cancel();
                println!("cancelled");
                return Ok(());
            }
            if let Some(outcome) = self.gate.confirm() {
                outcome?;
            }
        } else {
            self.lifecycle.create_fresh()?;
        }

        let identity = self.session.identity().context("no identity active")?;
        println!("{}", identity.address);
        Ok(())
    }

    fn restore(&self, address: &str, password: &str) -> Result<()> {
        let identity = self.lifecycle.restore(address, password)?;
        println!("restored {}", identity.address);
        self.sync.sync()?;
        println!("{} message(s) in the inbox", self.session.messages().len());
        Ok(())
    }

    fn watch(&self) -> Result<()> {
        if !self.session.has_identity() {
            let identity = self.lifecycle.create_fresh()?;
            println!("provisioned {}", identity.address);
        }

        let identity = self.session.identity().context("no identity active")?;
        println!("watching {} (Enter lists the inbox, q quits)", identity.address);

        let handle = start_poller(self.sync.clone(), DEFAULT_POLL_INTERVAL);

        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim() == "q" {
                break;
            }
            self.print_inbox();
        }

        // Deterministic teardown: no cycle fires after this returns
        info!("stopping inbox watch");
        handle.stop();
        Ok(())
    }

    fn print_inbox(&self) {
        if let Some(notice) = self.session.take_notice() {
            println!("notice: {}", notice);
        }

        let messages = self.session.messages();
        if messages.is_empty() {
            println!("(inbox empty)");
            return;
        }
        for m in messages {
            println!(
                "{}  {:<30}  {}  [{}]",
                m.created_at.format("%H:%M:%S"),
                m.from.display(),
                if m.subject.is_empty() { "(no subject)" } else { m.subject.as_str() },
                m.id.as_str()
            );
        }
    }

    fn purge(&self, args: &[String]) -> Result<()> {
        match args.first().map(String::as_str) {
            None => {
                let policy = self.session.policy();
                if policy.enabled {
                    println!("purge on, {} h window", policy.window.num_hours());
                } else {
                    println!("purge off ({} h window kept)", policy.window.num_hours());
                }
                Ok(())
            }
            Some("off") => {
                let window = self.session.policy().window;
                self.lifecycle.set_retention(RetentionPolicy::disabled(window))?;
                println!("purge off");
                Ok(())
            }
            Some("on") => {
                let hours: i64 = args
                    .get(1)
                    .context("usage: swiftmail purge on <hours>")?
                    .parse()
                    .context("window must be a whole number of hours")?;
                if hours <= 0 {
                    bail!("window must be at least 1 hour");
                }
                self.lifecycle
                    .set_retention(RetentionPolicy::enabled(Duration::hours(hours)))?;
                println!("purge on, {} h window", hours);
                Ok(())
            }
            Some(other) => bail!("unknown purge setting: {other}"),
        }
    }

    fn read(&self, id: &str) -> Result<()> {
        let detail = self.sync.fetch_detail(&MessageId::new(id))?;
        println!("from:    {}", detail.summary.from.display());
        println!("subject: {}", detail.summary.subject);
        println!("date:    {}", detail.summary.created_at.to_rfc2822());
        println!();
        if detail.text.is_empty() {
            for html in &detail.html {
                println!("{}", html);
            }
        } else {
            println!("{}", detail.text);
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let message_id = MessageId::new(id);
        let sync = self.sync.clone();
        self.gate.request(
            "Delete message",
            format!("Permanently delete message {}?", id),
            move || sync.delete_message(&message_id),
        );

        if !self.prompt_pending()? {
            self.gate.cancel();
            println!("cancelled");
            return Ok(());
        }
        if let Some(outcome) = self.gate.confirm() {
            outcome?;
            println!("deleted");
        }
        Ok(())
    }

    /// Show the pending confirmation and ask for an explicit yes
    fn prompt_pending(&self) -> Result<bool> {
        let Some((title, message)) = self.gate.pending() else {
            return Ok(false);
        };
        print!("{}\n{}\nProceed? [y/N] ", title, message);
        std::io::stdout().flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(matches!(line.trim(), "y" | "Y" | "yes"))
    }
}
