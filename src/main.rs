use clap::Parser;
use coffee_match::{batch, cli, config, dictionary, error};
use coffee_match_common::{
    generate_match_score_text, get_score_grade, MatchResult, MatchScorer, RoasterNotes, SensoryInput,
    UserSelections,
};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load()?;
    if let Some(path) = &cli.dictionary {
        config.dictionary_path = Some(path.clone());
    }

    match cli.command {
        Commands::Score { flavors, expressions, intensity, note, note_file, enhanced, json } => {
            let dictionary = dictionary::load_dictionary(&config)?;
            let scorer = MatchScorer::new(&dictionary, config.match_options(enhanced));

            let note = match (note, note_file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)?,
                (None, None) => String::new(),
            };
            let input = match intensity {
                Some(profile) => SensoryInput::Intensities(profile),
                None => SensoryInput::Descriptors(expressions),
            };

            let result = scorer.calculate_match_score(&flavors, &input, &note);
            print_result(result.as_ref(), json)?;
        }

        Commands::Detailed { flavors, user, roaster, note, json } => {
            let dictionary = dictionary::load_dictionary(&config)?;
            let scorer = MatchScorer::new(&dictionary, config.match_options(false));

            let result = scorer.calculate_detailed_match(
                &UserSelections { flavors, profile: user },
                &RoasterNotes { note, profile: roaster },
            );
            print_result(result.as_ref(), json)?;
        }

        Commands::Grade { score } => {
            let grade = get_score_grade(score);
            println!("{} {} ({}) {}", grade.emoji, grade.label, grade.korean_label, grade.color);
        }

        Commands::Batch { input, output, enhanced, quiet } => {
            println!("☕ coffee-match - 일괄 계산\n");

            let records = batch::load_records(&input)?;
            println!("✔ 기록 {}건 읽음", records.len());

            let dictionary = dictionary::load_dictionary(&config)?;
            let fingerprint = dictionary::fingerprint(&dictionary)?;
            let scorer = MatchScorer::new(&dictionary, config.match_options(enhanced));

            let report = batch::run_batch(&records, &scorer, fingerprint, !quiet);
            info!("사전 지문: {}", report.dictionary_fingerprint);

            let output = output.unwrap_or_else(|| cli::default_report_path(&input));
            std::fs::write(&output, serde_json::to_string_pretty(&report)?)?;

            let summary = &report.summary;
            println!("✔ 계산 {}건 / 노트 없음 {}건 / 오류 {}건", summary.scored, summary.skipped, summary.failed);
            if let Some(average) = summary.average_score {
                println!("  평균 점수: {:.1}", average);
            }
            println!("✔ 결과 저장: {}", output.display());
        }

        Commands::Dict { lookup, check, stats } => {
            if let Some(path) = check {
                let custom = dictionary::load_custom(&path)?;
                let s = custom.stats();
                println!("✔ 사전 검증 완료: 향미 {}개, 감각 {}개", s.flavor_entries, s.sensory_entries);
            }

            let dictionary = dictionary::load_dictionary(&config)?;

            if let Some(tag) = lookup {
                match dictionary.lookup_flavor(&tag) {
                    Some(entry) => {
                        println!("{} [{}]", entry.canonical, entry.tiers.category);
                        println!("  primary:  {}", entry.tiers.primary.join(", "));
                        println!("  related:  {}", entry.tiers.related.join(", "));
                        println!("  similar:  {}", entry.tiers.similar.join(", "));
                        println!("  opposite: {}", entry.tiers.opposite.join(", "));
                    }
                    None => println!("'{}'은(는) 사전에 없습니다 (태그 자체로 매치합니다)", tag),
                }
            }

            if stats {
                let s = dictionary.stats();
                println!("사전 통계:");
                println!("  향미 항목: {}", s.flavor_entries);
                println!("  감각 카테고리: {}", s.sensory_categories);
                println!("  감각 항목: {}", s.sensory_entries);
                println!("  전체 용어: {}", s.total_terms);
                println!("  지문: {}", dictionary::fingerprint(&dictionary)?);
            }
        }

        Commands::Config { set_dictionary, set_max_flavors, enhanced, show } => {
            // --dictionary の一時指定は保存しない
            let mut config = Config::load()?;

            if let Some(path) = set_dictionary {
                config.dictionary_path = Some(path);
            }
            if let Some(max) = set_max_flavors {
                config.max_flavors = max;
            }
            if let Some(flag) = enhanced {
                config.enhanced = flag;
            }
            if config != Config::load()? {
                config.save()?;
                println!("✔ 설정을 저장했습니다");
            }

            if show {
                println!("설정:");
                println!(
                    "  추가 사전: {}",
                    config
                        .dictionary_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "없음".into())
                );
                println!("  향미 태그 최대: {}", config.max_flavors);
                println!("  유사 매치: {}", if config.enhanced { "사용" } else { "사용 안 함" });
                println!("  퍼지 허용 비율: {}", config.fuzzy_threshold);
                println!("  강도 스케일: {}-{}", config.scale_min, config.scale_max);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "coffee_match=debug,coffee_match_common=debug"
    } else {
        "coffee_match=info,coffee_match_common=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn print_result(result: Option<&MatchResult>, json: bool) -> Result<()> {
    match (result, json) {
        (Some(result), true) => println!("{}", serde_json::to_string_pretty(result)?),
        (Some(result), false) => println!("{}", generate_match_score_text(result)),
        (None, true) => println!("null"),
        (None, false) => println!("로스터 노트가 없어 매치 스코어를 계산하지 않았습니다"),
    }
    Ok(())
}
