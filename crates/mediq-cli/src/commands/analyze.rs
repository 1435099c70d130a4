//! `mediq analyze` — Run the diagnostic pipeline from the command line.

use std::io::Read;
use std::time::Duration;

const BANNER: &str = "======================================================================";

pub async fn run(
    catalog_dir: Option<&str>,
    text: Option<String>,
    file: Option<&str>,
    timeout_secs: Option<u64>,
    json: bool,
) -> Result<(), String> {
    let patient_input = read_input(text, file)?;
    if patient_input.trim().is_empty() {
        return Err("No symptoms provided".to_string());
    }

    let config = super::load_config(catalog_dir);
    let service = super::init_service(config)?;

    if !json {
        println!("🔄 Analyzing symptoms (model: {})...", service.config().model);
        println!("This may take a minute or two.\n");
    }

    let envelope = match timeout_secs {
        Some(secs) => {
            service
                .analyze_with_timeout(&patient_input, Duration::from_secs(secs))
                .await
        }
        None => service.analyze(&patient_input).await,
    };

    if json {
        let value = serde_json::to_value(&envelope).map_err(|e| e.to_string())?;
        super::print_json(&value);
        return if envelope.success {
            Ok(())
        } else {
            Err("Analysis failed".to_string())
        };
    }

    match (envelope.success, envelope.result, envelope.error) {
        (true, Some(result), _) => {
            println!("{}", BANNER);
            println!("📄 DIAGNOSTIC GUIDANCE");
            println!("{}", BANNER);
            println!();
            println!("{}", result);
            println!();
            println!("{}", BANNER);
            println!("⚕️  This analysis is educational only. Consult a healthcare");
            println!("   professional for proper diagnosis and treatment.");
            println!(
                "   Completed in {:.1}s.",
                envelope.metadata.duration_seconds
            );
            Ok(())
        }
        (_, _, error) => Err(error.unwrap_or_else(|| "Analysis failed".to_string())),
    }
}

/// Resolve the symptom description: positional text, then --file, then stdin.
fn read_input(text: Option<String>, file: Option<&str>) -> Result<String, String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e));
    }

    eprintln!("Reading symptoms from stdin (end with Ctrl-D)...");
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("Failed to read stdin: {}", e))?;
    Ok(buffer)
}
