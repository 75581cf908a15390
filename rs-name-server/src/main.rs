use std::collections::HashMap;
use std::env;

use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};

use serde::Deserialize;
use rs_name_core::error::NameError;
use rs_name_core::io::{list_files, normalize_folder};
use rs_name_core::model::generate_input::GenerateInput;
use rs_name_core::model::generator::NameGenerator;

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_DATA: &str = "./data";

/// Reserved query parameters of the `/v1/generate` endpoint.
///
/// Every other parameter is a category name whose value is a
/// comma-separated list of selectors (ex. `given=female,male`).
#[derive(Deserialize)]
struct GenerateParams {
	format: Option<String>,
	capitalize: Option<bool>,
}

struct SharedData {
	generator: NameGenerator,
	data_dir: String,
}

impl GenerateParams {
	/// Builds the per-call input from the typed and the free-form parameters.
	fn to_input(&self, query: &HashMap<String, String>) -> GenerateInput {
		let mut input = GenerateInput::new();
		if let Some(format) = &self.format {
			input = input.with_template(format);
		}
		if let Some(capitalize) = self.capitalize {
			input = input.with_capitalize(capitalize);
		}

		for (category, value) in query {
			if category == "format" || category == "capitalize" {
				continue;
			}
			let selectors: Vec<&str> = value
				.split(',')
				.map(|s| s.trim())
				.filter(|s| !s.is_empty())
				.collect();
			input = input.with_selectors(category, &selectors);
		}
		input
	}
}

fn error_response(e: &NameError) -> HttpResponse {
	if e.is_configuration_error() {
		HttpResponse::BadRequest().body(e.to_string())
	} else {
		error!("generation failed: {e}");
		HttpResponse::InternalServerError().body(e.to_string())
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates one name. Optional `format` overrides the template,
/// `capitalize` the capitalization; other parameters restrict categories
/// to selectors.
#[get("/v1/generate")]
async fn get_generated(
	data: web::Data<SharedData>,
	params: web::Query<GenerateParams>,
	query: web::Query<HashMap<String, String>>,
) -> impl Responder {
	let input = params.to_input(&query);

	match data.generator.generate(&input) {
		Ok(name) => HttpResponse::Ok().body(name),
		Err(e) => error_response(&e),
	}
}

/// Lists categories and their selectors, one `category: a,b` line each.
#[get("/v1/categories")]
async fn get_categories(data: web::Data<SharedData>) -> impl Responder {
	let lines: Vec<String> = data
		.generator
		.config()
		.categories()
		.map(|category| format!("{}: {}", category.name(), category.selectors().collect::<Vec<_>>().join(",")))
		.collect();
	HttpResponse::Ok().body(lines.join("\n"))
}

/// Lists the `.csv` tables available in the data directory.
#[get("/v1/sources")]
async fn get_sources(data: web::Data<SharedData>) -> impl Responder {
	match list_files(&data.data_dir, "csv") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list sources")
	}
}

/// Main entry point for the server.
///
/// Builds the census name generator once and shares it, read-only, with
/// every worker. No lock is needed: generation never mutates the generator.
///
/// # Notes
/// - `RS_NAME_BIND` sets the address (default 127.0.0.1:5000).
/// - `RS_NAME_DATA` sets the census data directory (default ./data).
/// - `RUST_LOG` controls logging (default `info`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let bind = env::var("RS_NAME_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
	let data_dir = env::var("RS_NAME_DATA").unwrap_or_else(|_| DEFAULT_DATA.to_owned());

	let generator = NameGenerator::census(normalize_folder(&data_dir))
		.map_err(|e| std::io::Error::other(e.to_string()))?;
	let shared_data = web::Data::new(SharedData { generator, data_dir });

	info!("serving names on {bind}");
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_categories)
			.service(get_sources)
	})
		.workers(num_cpus::get())
		.bind(bind)?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn free_form_parameters_become_selectors() {
		let params = GenerateParams { format: Some("{given}".to_owned()), capitalize: Some(false) };
		let mut query = HashMap::new();
		query.insert("format".to_owned(), "{given}".to_owned());
		query.insert("given".to_owned(), "female, male,".to_owned());

		let input = params.to_input(&query);
		assert_eq!(input.template.as_deref(), Some("{given}"));
		assert_eq!(input.capitalize, Some(false));
		assert_eq!(input.selectors("given"), ["female".to_owned(), "male".to_owned()]);
		assert!(input.selectors("format").is_empty());
	}
}
