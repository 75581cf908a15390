use rand::SeedableRng;
use rand::rngs::StdRng;
use rs_name_core::model::config::ConfigBuilder;
use rs_name_core::model::formatter::RepairRule;
use rs_name_core::model::generate_input::GenerateInput;
use rs_name_core::model::generator::NameGenerator;
use rs_name_core::model::sampler::ExhaustionPolicy;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Census tables are expected in the "data" directory:
    // dist.male.first.1990.csv, dist.female.first.1990.csv, dist.all.last.2000.csv
    let app: NameGenerator = NameGenerator::census("./data")?;

    // Default template "{given} {surname}", any given-name table
    let input = GenerateInput::new();
    for i in 0..10 {
        println!("Generated name {}: {}", i + 1, app.generate(&input)?);
    }

    // Restrict the given name to the female table
    let female = GenerateInput::new().with_selector("given", "female");
    println!("Female name: {}", app.generate(&female)?);

    // Unknown selectors fall back to every table of the category
    let unknown = GenerateInput::new().with_selector("given", "unknown");
    println!("Any given name: {}", app.generate(&unknown)?);

    // Custom template, raw capitalization
    let raw = GenerateInput::new()
        .with_template("{surname}, {given}")
        .with_capitalize(false);
    println!("Raw name: {}", app.generate(&raw)?);

    // Extra rules run after the built-in surname rules
    let hyphen = RepairRule::new(r"^(\w+)$", |caps| format!("{}-Smith", &caps[1]))?;
    let double = GenerateInput::new().with_rule("surname", hyphen);
    println!("Double-barrelled: {}", app.generate(&double)?);

    // Referencing a category that has no table is a configuration error
    match app.generate(&GenerateInput::new().with_template("{given} {middle} {surname}")) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected template: {e}"),
    }

    // Seeded generation is reproducible; tables are loaded in memory once
    let seeded = NameGenerator::new(
        ConfigBuilder::census("./data")
            .preload(true)
            .exhaustion_policy(ExhaustionPolicy::Retry { attempts: 3 })
            .build()?,
    );
    let mut rng = StdRng::seed_from_u64(42);
    println!("Seeded name: {}", seeded.generate_with_rng(&input, &mut rng)?);

    Ok(())
}
