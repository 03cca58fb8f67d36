//! `catalog` command

use anyhow::Result;
use arena_core::{FrameworkProfile, ModelPricing, PricingTable};
use arena_providers::Credential;
use comfy_table::{Cell, CellAlignment};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::context::Context;
use crate::output::{format_cost, print_field, print_section, OutputFormat, TableDisplay};

/// List frameworks and priced models
pub fn execute(ctx: &Context) -> Result<()> {
    let frameworks: Vec<FrameworkDisplay> = FrameworkProfile::builtin()
        .into_iter()
        .map(|profile| {
            let live = Credential::resolve(ctx.config.credentials.get(&profile.id)).is_some();
            FrameworkDisplay { profile, live }
        })
        .collect();

    let pricing = PricingTable::from_config(&ctx.config.pricing);
    let models: Vec<ModelDisplay> = pricing.models().iter().map(ModelDisplay).collect();

    match ctx.output_format {
        OutputFormat::Json => ctx.output.write_json(&Catalog {
            frameworks: &frameworks,
            models: &models,
            fallback_rate: pricing.fallback_rate(),
        }),
        OutputFormat::Table => {
            print_section("Frameworks");
            ctx.output
                .write_table(&frameworks, &["ID", "Name", "Path", "Strengths"]);

            print_section("Models");
            ctx.output
                .write_table(&models, &["ID", "Name", "Rate / 1k tokens"]);
            print_field("Unknown models", &format_cost(pricing.fallback_rate()));
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct Catalog<'a> {
    frameworks: &'a [FrameworkDisplay],
    models: &'a [ModelDisplay<'a>],
    #[serde(with = "rust_decimal::serde::float")]
    fallback_rate: Decimal,
}

/// Displayable framework for output
#[derive(Serialize)]
struct FrameworkDisplay {
    #[serde(flatten)]
    profile: FrameworkProfile,
    live: bool,
}

impl TableDisplay for FrameworkDisplay {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.profile.id),
            Cell::new(&self.profile.display_name),
            Cell::new(if self.live { "live" } else { "mock" }),
            Cell::new(&self.profile.strengths),
        ]
    }

    fn display_single(&self) {
        print_section(&self.profile.display_name);
        print_field("ID", self.profile.id.as_str());
        print_field("Strengths", &self.profile.strengths);
        print_field("Process", &self.profile.process_hint);
    }
}

/// Displayable model for output
#[derive(Serialize)]
#[serde(transparent)]
struct ModelDisplay<'a>(&'a ModelPricing);

impl TableDisplay for ModelDisplay<'_> {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.0.id),
            Cell::new(&self.0.display_name),
            Cell::new(format_cost(self.0.rate_per_1k)).set_alignment(CellAlignment::Right),
        ]
    }

    fn display_single(&self) {
        print_section(&self.0.display_name);
        print_field("ID", self.0.id.as_str());
        print_field("Rate / 1k tokens", &format_cost(self.0.rate_per_1k));
    }
}
