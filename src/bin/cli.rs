use clap::Parser;
use std::path::PathBuf;
use tankfield::level::{generate_level, survey};
use tankfield::png::save_as_png;
use tankfield::{GeneratorKind, MapConfig, generate};

/// Генератор поля боя для танковой аркады
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (по умолчанию: встроенные настройки)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Сид генерации (перекрывает значение из конфигурации)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Вид генератора (перекрывает значение из конфигурации)
    #[arg(short, long, value_enum)]
    generator: Option<GeneratorKind>,

    /// Номер уровня: генератор выбирается по кругу, сид выводится из базового
    #[arg(short, long)]
    level: Option<u32>,

    /// Сохранить превью в PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Сохранить матрицу кодов тайлов в JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Прогнать N сидов подряд и вывести статистику связности
    #[arg(long)]
    survey: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            println!("🔍 Загрузка конфигурации из {}...", path.display());
            MapConfig::from_toml_file(path)?
        }
        None => MapConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(kind) = cli.generator {
        config.generator = kind;
    }

    if let Some(runs) = cli.survey {
        let base = config.seed.unwrap_or(0);
        let seeds: Vec<u64> = (0..runs as u64).map(|i| base.wrapping_add(i)).collect();
        println!(
            "📊 Прогон {} сидов генератора {} ({}×{})...",
            runs,
            config.generator.name(),
            config.rows,
            config.cols
        );
        let report = survey(&config, &seeds);
        println!("  Минимальная доля достижимых: {:.3}", report.min_ratio);
        println!("  Средняя доля достижимых:     {:.3}", report.mean_ratio);
        println!("  Не дотянули до порога:       {}", report.degraded);
        println!("  Максимум попыток:            {}", report.max_attempts);
        return Ok(());
    }

    println!(
        "🗺️  Генерация поля {}×{}...",
        config.rows, config.cols
    );
    let result = match cli.level {
        Some(level) => generate_level(&config, level),
        None => generate(&config),
    };
    let map = match result {
        Ok(map) => map,
        Err(degraded) => {
            println!("⚠️  Порог связности не достигнут, используется последняя попытка");
            degraded.into_inner()
        }
    };

    println!(
        "Генератор: {}, попыток: {}, доля достижимых: {:.3}\n",
        map.kind.name(),
        map.attempts,
        map.reachable_ratio
    );
    print!("{}", map.grid);

    if let Some(path) = &cli.png {
        println!("\nСохранение превью в {}", path.display());
        let path = path.to_str().ok_or("PNG path is not valid UTF-8")?;
        save_as_png(&map.grid, config.tile_size, path)?;
    }

    if let Some(path) = &cli.json {
        println!("Сохранение кодов тайлов в {}", path.display());
        std::fs::write(path, serde_json::to_string_pretty(&map.grid.to_codes())?)?;
    }

    println!("\nГотово!");
    Ok(())
}
