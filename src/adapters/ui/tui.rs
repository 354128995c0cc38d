//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Menu loop: diagnose a photo (with registration prompt, image tools, and
//! follow-up chat) or browse the growth diary. Presentation only — every
//! decision lives in the domain and use cases.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, Select, Text};
use tokio::fs;

use crate::domain::{
    Diagnosis, DomainError, MediaType, Notification, Plant, PlantPhoto, Severity,
    derive_notifications,
};
use crate::domain::notifications::preview_notifications;
use crate::ports::InputPort;
use crate::usecases::{DiagnosisService, DiaryService};

const MENU_DIAGNOSE: &str = "Diagnose a photo";
const MENU_PLANTS: &str = "My plants";
const MENU_QUIT: &str = "Quit";

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    diagnosis: Arc<DiagnosisService>,
    diary: Arc<DiaryService>,
    images_dir: PathBuf,
}

impl TuiInputPort {
    pub fn new(
        diagnosis: Arc<DiagnosisService>,
        diary: Arc<DiaryService>,
        images_dir: PathBuf,
    ) -> Self {
        Self {
            diagnosis,
            diary,
            images_dir,
        }
    }

    async fn diagnose_flow(&self) -> Result<(), DomainError> {
        let path = Text::new("Photo path:")
            .with_help_message("jpg, png, webp, or gif")
            .prompt()
            .map_err(prompt_err)?;
        let photo = match load_photo(Path::new(path.trim())).await {
            Ok(photo) => photo,
            Err(e) => {
                println!("{e}");
                return Ok(());
            }
        };

        let question = Text::new("Optional question:")
            .with_help_message("e.g. 'the leaves keep turning yellow' — leave empty to skip")
            .prompt()
            .map_err(prompt_err)?;

        let spinner = start_spinner("Analyzing your plant...");
        let result = self.diagnosis.diagnose(&photo, &question).await;
        spinner.finish_and_clear();

        let diagnosis = match result {
            Ok(d) => d,
            Err(e) => {
                // Terminal for this attempt; the user re-submits to retry.
                println!("{e}");
                return Ok(());
            }
        };

        print_diagnosis(&diagnosis);
        for n in preview_notifications(&diagnosis) {
            print_notification(&n);
        }

        let mut session = self.diagnosis.open_chat(diagnosis.clone());
        println!("\n{}", session.transcript()[0].text);

        self.registration_flow(&photo, &diagnosis, &mut session)
            .await?;

        loop {
            let choice = Select::new(
                "Next:",
                vec![
                    "Chat about this diagnosis",
                    "Recolor the flower",
                    "Preview a future bloom",
                    "Done",
                ],
            )
            .prompt()
            .map_err(prompt_err)?;

            match choice {
                "Chat about this diagnosis" => self.chat_flow(&mut session).await?,
                "Recolor the flower" => self.recolor_flow(&photo).await?,
                "Preview a future bloom" => self.bloom_flow(&photo, &diagnosis).await?,
                _ => break,
            }
        }
        Ok(())
    }

    /// Offer to save the fresh diagnosis into the diary, as a new plant or
    /// as an entry of an already-registered one.
    async fn registration_flow(
        &self,
        photo: &PlantPhoto,
        diagnosis: &Diagnosis,
        session: &mut crate::usecases::ChatSession,
    ) -> Result<(), DomainError> {
        let mut options = vec!["Register as a new plant"];
        let plants = self.diary.plants().await;
        if !plants.is_empty() {
            options.push("Add an entry to an existing plant");
        }
        options.push("Skip");

        let choice = Select::new("Save this diagnosis to your growth diary?", options)
            .prompt()
            .map_err(prompt_err)?;

        match choice {
            "Register as a new plant" => {
                let entry = crate::domain::DiaryEntry::from_photo(photo, diagnosis.clone());
                let plant = self.diary.create_plant(entry).await?;
                let line = format!(
                    "{} is now a registered companion plant! You can keep a growth diary for it.",
                    plant.name
                );
                session.push_scripted(line.clone());
                println!("{line}");
            }
            "Add an entry to an existing plant" => {
                let labels: Vec<String> = plants
                    .iter()
                    .map(|p| format!("{} ({} entries)", p.name, p.entries.len()))
                    .collect();
                let picked = Select::new("Which plant?", labels.clone())
                    .prompt()
                    .map_err(prompt_err)?;
                let idx = labels.iter().position(|l| *l == picked).unwrap_or(0);
                let entry = crate::domain::DiaryEntry::from_photo(photo, diagnosis.clone());
                match self.diary.append_entry(&plants[idx].id, entry).await {
                    Ok(()) => println!("Entry added to {}.", plants[idx].name),
                    Err(e @ DomainError::Mismatch { .. }) => {
                        // Recoverable: nothing was written, the user can
                        // re-submit another photo.
                        println!("{e}. The entry was not added.");
                    }
                    Err(e) => return Err(e),
                }
            }
            _ => {
                session.push_scripted("Okay — you can keep chatting without registering.");
            }
        }
        Ok(())
    }

    async fn chat_flow(
        &self,
        session: &mut crate::usecases::ChatSession,
    ) -> Result<(), DomainError> {
        loop {
            let text = Text::new("You:")
                .with_help_message("empty message to finish")
                .prompt()
                .map_err(prompt_err)?;
            if text.trim().is_empty() {
                break;
            }
            let spinner = start_spinner("Thinking...");
            let reply = session.send_message(text.trim()).await;
            spinner.finish_and_clear();
            println!("{reply}\n");
        }
        Ok(())
    }

    async fn recolor_flow(&self, photo: &PlantPhoto) -> Result<(), DomainError> {
        let color = Text::new("Target flower color:")
            .prompt()
            .map_err(prompt_err)?;
        let spinner = start_spinner("Repainting the blooms...");
        let result = self.diagnosis.recolor_flower(photo, color.trim()).await;
        spinner.finish_and_clear();
        match result {
            Ok(bytes) => self.save_image("recolor", &bytes).await,
            Err(e) => {
                println!("{e}");
                Ok(())
            }
        }
    }

    async fn bloom_flow(
        &self,
        photo: &PlantPhoto,
        diagnosis: &Diagnosis,
    ) -> Result<(), DomainError> {
        // Prefer the model's own color suggestions when it gave any.
        let color = match &diagnosis.potential_flower_colors {
            Some(colors) if !colors.is_empty() => {
                let mut options = colors.clone();
                options.push("Another color...".to_string());
                let picked = Select::new("Which bloom color?", options)
                    .prompt()
                    .map_err(prompt_err)?;
                if picked == "Another color..." {
                    Text::new("Bloom color:").prompt().map_err(prompt_err)?
                } else {
                    picked
                }
            }
            _ => Text::new("Bloom color:").prompt().map_err(prompt_err)?,
        };

        let spinner = start_spinner("Growing the blossoms...");
        let result = self
            .diagnosis
            .render_future_bloom(photo, &diagnosis.plant_name, color.trim())
            .await;
        spinner.finish_and_clear();
        match result {
            Ok(bytes) => self.save_image("bloom", &bytes).await,
            Err(e) => {
                println!("{e}");
                Ok(())
            }
        }
    }

    async fn save_image(&self, label: &str, bytes: &[u8]) -> Result<(), DomainError> {
        fs::create_dir_all(&self.images_dir)
            .await
            .map_err(|e| DomainError::Storage(format!("create images dir: {e}")))?;
        let path = self
            .images_dir
            .join(format!("{label}-{}.png", Utc::now().timestamp()));
        fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::Storage(format!("save image: {e}")))?;
        println!("Saved to {}", path.display());
        Ok(())
    }

    async fn plants_flow(&self) -> Result<(), DomainError> {
        loop {
            let plants = self.diary.plants().await;
            if plants.is_empty() {
                println!("No plants registered yet. Diagnose a photo to start a diary.");
                return Ok(());
            }

            let mut labels: Vec<String> = plants
                .iter()
                .map(|p| format!("{} ({} entries)", p.name, p.entries.len()))
                .collect();
            labels.push("Back".to_string());
            let picked = Select::new("Your plants:", labels.clone())
                .prompt()
                .map_err(prompt_err)?;
            if picked == "Back" {
                return Ok(());
            }
            let idx = labels.iter().position(|l| *l == picked).unwrap_or(0);
            self.plant_detail_flow(&plants[idx].id).await?;
        }
    }

    async fn plant_detail_flow(&self, plant_id: &str) -> Result<(), DomainError> {
        loop {
            let Some(plant) = self.diary.get(plant_id).await else {
                return Ok(());
            };
            print_plant_detail(&plant);
            for n in derive_notifications(&plant) {
                print_notification(&n);
            }

            let choice = Select::new(
                "Plant actions:",
                vec!["Delete an entry", "Delete this plant", "Back"],
            )
            .prompt()
            .map_err(prompt_err)?;

            match choice {
                "Delete an entry" => {
                    if plant.entries.is_empty() {
                        println!("This plant has no entries.");
                        continue;
                    }
                    let labels: Vec<String> = plant
                        .entries_newest_first()
                        .iter()
                        .map(|e| {
                            format!(
                                "{} — {}",
                                e.date.format("%Y-%m-%d %H:%M"),
                                e.analysis.health_status
                            )
                        })
                        .collect();
                    let picked = Select::new("Which entry?", labels.clone())
                        .prompt()
                        .map_err(prompt_err)?;
                    let idx = labels.iter().position(|l| *l == picked).unwrap_or(0);
                    let victim_id = plant.entries_newest_first()[idx].id.clone();
                    let remaining: Vec<_> = plant
                        .entries
                        .iter()
                        .filter(|e| e.id != victim_id)
                        .cloned()
                        .collect();
                    self.diary.update_entries(plant_id, remaining).await?;
                    println!("Entry deleted.");
                }
                "Delete this plant" => {
                    let confirmed =
                        Confirm::new("All records for this plant will be deleted. Are you sure?")
                            .with_default(false)
                            .prompt()
                            .map_err(prompt_err)?;
                    if confirmed {
                        self.diary.delete_plant(plant_id).await?;
                        println!("Plant deleted.");
                        return Ok(());
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let choice = Select::new(
                "What would you like to do?",
                vec![MENU_DIAGNOSE, MENU_PLANTS, MENU_QUIT],
            )
            .prompt()
            .map_err(prompt_err)?;

            match choice {
                MENU_DIAGNOSE => self.diagnose_flow().await?,
                MENU_PLANTS => self.plants_flow().await?,
                _ => return Ok(()),
            }
        }
    }
}

fn prompt_err(e: inquire::InquireError) -> DomainError {
    DomainError::InvalidInput(e.to_string())
}

/// Read a photo from disk, inferring the media type from the extension.
async fn load_photo(path: &Path) -> Result<PlantPhoto, DomainError> {
    let media_type = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(MediaType::from_extension)
        .ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "unsupported image type: {} (expected jpg, png, webp, or gif)",
                path.display()
            ))
        })?;
    let bytes = fs::read(path)
        .await
        .map_err(|e| DomainError::InvalidInput(format!("cannot read {}: {e}", path.display())))?;
    Ok(PlantPhoto { bytes, media_type })
}

fn start_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_notification(notification: &Notification) {
    let (color, tag) = match notification.severity {
        Severity::Warning => (Color::Yellow, "[!]"),
        Severity::Info => (Color::Cyan, "[i]"),
        Severity::Success => (Color::Green, "[ok]"),
    };
    let mut out = std::io::stdout();
    let _ = out.execute(SetForegroundColor(color));
    let _ = out.execute(Print(format!("{tag} {}\r\n", notification.message)));
    let _ = out.execute(ResetColor);
}

fn print_diagnosis(d: &Diagnosis) {
    println!("\n=== {} ===", d.plant_name);
    if let Some(alias) = &d.common_alias {
        println!("Also known as: {alias}");
    }
    if let Some(scientific) = &d.scientific_name {
        println!("Scientific name: {scientific}");
    }
    if let Some(language) = &d.flower_language {
        println!("Flower language: {language}");
    }
    println!("Health: {}", d.health_status);
    println!("\n{}", d.diagnosis);

    print_pair("Hydration", &d.hydration_summary, &d.hydration_detail);
    print_pair("Sunlight", &d.sunlight_summary, &d.sunlight_detail);
    print_pair("Harvest", &d.harvest_summary, &d.harvest_detail);
    print_pair("Repotting", &d.repotting_summary, &d.repotting_detail);
    print_pair("Pruning", &d.pruning_summary, &d.pruning_detail);
    print_pair(
        "Pests & disease",
        &d.pest_disease_summary,
        &d.pest_disease_detail,
    );

    if let Some(acidity) = &d.soil_acidity {
        println!("Soil acidity: {acidity}");
    }
    if d.is_color_changing_flower {
        if let Some(guide) = &d.color_change_guide {
            println!("Turn blooms blue: {}", guide.to_blue);
            println!("Turn blooms pink: {}", guide.to_pink);
        }
    }
    if let Some(colors) = &d.potential_flower_colors {
        if !colors.is_empty() {
            println!("Potential bloom colors: {}", colors.join(", "));
        }
    }

    if !d.recommendations.is_empty() {
        println!("\nRecommendations:");
        for r in &d.recommendations {
            println!("  - {r}");
        }
    }
    println!();
}

fn print_pair(label: &str, summary: &Option<String>, detail: &Option<String>) {
    // Absent summary means "not applicable", so the whole topic is skipped.
    if let Some(summary) = summary {
        println!("{label}: {summary}");
        if let Some(detail) = detail {
            println!("  {detail}");
        }
    }
}

fn print_plant_detail(plant: &Plant) {
    println!("\n=== {} — growth diary ===", plant.name);
    if plant.entries.is_empty() {
        println!("(no entries)");
    }
    for entry in plant.entries_newest_first() {
        let diagnosis_line: String = entry.analysis.diagnosis.chars().take(80).collect();
        println!(
            "{} | {} | {}",
            entry.date.format("%Y-%m-%d %H:%M"),
            entry.analysis.health_status,
            diagnosis_line
        );
    }
}
