use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Args;
use dialoguer::Confirm;
use famcal_core::date::parse_day;
use famcal_core::{Child, ChildDraft, GradeLevel};
use owo_colors::OwoColorize;

use crate::commands::{Context, submit};
use crate::render::Render;
use crate::utils::prompt::{prompt_optional, prompt_text, prompt_with_retry, select};
use crate::utils::tui;

/// Child fields; anything left out is asked for interactively.
#[derive(Args, Debug, Default)]
pub struct ChildArgs {
    #[arg(short, long)]
    pub name: Option<String>,

    /// Grade: "prek", "k", "1" to "12" or the full label
    #[arg(short, long)]
    pub grade: Option<GradeLevel>,

    #[arg(short, long)]
    pub school: Option<String>,

    /// Birth date (YYYY-MM-DD)
    #[arg(short, long)]
    pub birth_date: Option<String>,
}

impl ChildArgs {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.grade.is_none() && self.school.is_none() && self.birth_date.is_none()
    }

    /// Overwrite the draft's fields with the ones given on the command line.
    fn apply(self, draft: &mut ChildDraft) -> Result<()> {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(grade) = self.grade {
            draft.grade_level = grade;
        }
        if let Some(school) = self.school {
            draft.school_name = school;
        }
        if let Some(birth) = self.birth_date {
            draft.birth_date = parse_birth_date(&birth)?;
        }
        Ok(())
    }
}

/// Empty input clears the birth date.
fn parse_birth_date(input: &str) -> Result<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_day(input)?))
}

pub async fn list(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let children = tui::with_spinner("Loading children", client.list_children()).await?;

    if children.is_empty() {
        println!("{}", "No children yet. Add one with `famcal children add`".dimmed());
        return Ok(());
    }

    for child in &children {
        println!("{}", child.render());
    }
    Ok(())
}

pub async fn add(ctx: &Context, args: ChildArgs) -> Result<()> {
    let client = ctx.client()?;
    let interactive = args.name.is_none();

    let mut draft = ChildDraft {
        name: String::new(),
        grade_level: GradeLevel::Kindergarten,
        school_name: String::new(),
        birth_date: None,
    };

    if interactive {
        prompt_fields(&mut draft, &args)?;
    } else if args.grade.is_none() {
        anyhow::bail!("--grade is required when adding a child with --name");
    }
    args.apply(&mut draft)?;

    let child = submit(tui::with_spinner("Saving", client.create_child(&draft)).await)?;
    println!("{}", format!("  Added {} (#{})", child.name, child.id).green());
    Ok(())
}

pub async fn edit(ctx: &Context, id: i64, args: ChildArgs) -> Result<()> {
    let client = ctx.client()?;
    let children = tui::with_spinner("Loading children", client.list_children()).await?;
    let child = find_child(&children, id)?;

    let mut draft = child.to_draft();
    if args.is_empty() {
        prompt_fields(&mut draft, &args)?;
    }
    args.apply(&mut draft)?;

    if draft == child.to_draft() {
        println!("{}", "Nothing changed".dimmed());
        return Ok(());
    }

    let updated = submit(tui::with_spinner("Saving", client.update_child(id, &draft)).await)?;
    println!("{}", format!("  Updated {}", updated.name).green());
    Ok(())
}

pub async fn remove(ctx: &Context, id: i64, force: bool) -> Result<()> {
    let client = ctx.client()?;
    let children = tui::with_spinner("Loading children", client.list_children()).await?;
    let child = find_child(&children, id)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove {}? Their events stay on the calendar without a child attached",
                child.name
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    tui::with_spinner("Removing", client.delete_child(id)).await?;
    println!("Removed {}", child.name);
    Ok(())
}

fn find_child(children: &[Child], id: i64) -> Result<&Child> {
    children.iter().find(|c| c.id == id).ok_or_else(|| {
        let available: Vec<String> = children.iter().map(|c| format!("#{} {}", c.id, c.name)).collect();
        anyhow::anyhow!(
            "Child #{} not found. Available: {}",
            id,
            if available.is_empty() { "none".to_string() } else { available.join(", ") }
        )
    })
}

/// Ask for every field not given on the command line, pre-filled from `draft`.
fn prompt_fields(draft: &mut ChildDraft, args: &ChildArgs) -> Result<()> {
    if args.name.is_none() {
        let current = (!draft.name.is_empty()).then_some(draft.name.as_str());
        draft.name = prompt_text("  Name", current)?;
    }

    if args.grade.is_none() {
        draft.grade_level = select("  Grade", &GradeLevel::ALL, draft.grade_level)?;
    }

    if args.school.is_none() {
        let current = (!draft.school_name.is_empty()).then_some(draft.school_name.as_str());
        draft.school_name = prompt_optional("  School", current)?.unwrap_or_default();
    }

    if args.birth_date.is_none() {
        let today = Utc::now().date_naive();
        let initial = draft.birth_date.map(|d| d.to_string());
        draft.birth_date = prompt_with_retry("  Birth date, YYYY-MM-DD (skip)", initial, |input| {
            parse_birth_date(input).and_then(|date| match date {
                Some(d) if d > today => Err(anyhow::anyhow!("Birth date cannot be in the future")),
                other => Ok(other),
            })
        })?;
    }

    Ok(())
}
