use clap::{Parser, Subcommand};
use coffee_match_common::SensoryProfile;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coffee-match")]
#[command(about = "커피 테이스팅 노트 매치 스코어 계산 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 상세 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 추가 사전 JSON 파일 (설정보다 우선)
    #[arg(long, global = true)]
    pub dictionary: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 향미·감각 표현과 로스터 노트로 매치 스코어 계산
    Score {
        /// 향미 태그 (쉼표 구분)
        #[arg(short, long, value_delimiter = ',')]
        flavors: Vec<String>,

        /// 감각 표현 태그 (쉼표 구분)
        #[arg(short, long, value_delimiter = ',', conflicts_with = "intensity")]
        expressions: Vec<String>,

        /// 감각 강도 (예: acidity=5,body=2)
        #[arg(long)]
        intensity: Option<SensoryProfile>,

        /// 로스터 노트
        #[arg(short, long, conflicts_with = "note_file")]
        note: Option<String>,

        /// 로스터 노트 파일
        #[arg(long)]
        note_file: Option<PathBuf>,

        /// 퍼지·발음 유사 매치 사용
        #[arg(long)]
        enhanced: bool,

        /// 결과를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 숫자 강도 모드로 매치 스코어 계산
    Detailed {
        /// 향미 태그 (쉼표 구분)
        #[arg(short, long, value_delimiter = ',')]
        flavors: Vec<String>,

        /// 내 감각 강도 (예: acidity=5,sweetness=3,body=2,aftertaste=4)
        #[arg(long, required = true)]
        user: SensoryProfile,

        /// 로스터 감각 강도 (생략 시 노트에서 읽음)
        #[arg(long)]
        roaster: Option<SensoryProfile>,

        /// 로스터 노트
        #[arg(short, long, required = true)]
        note: String,

        /// 결과를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 점수의 등급 표시
    Grade {
        /// 점수 (0-100)
        #[arg(required = true, allow_negative_numbers = true)]
        score: i32,
    },

    /// 테이스팅 기록 JSON 일괄 계산
    Batch {
        /// 입력 JSON 파일 (기록 배열)
        #[arg(required = true)]
        input: PathBuf,

        /// 출력 JSON 파일 (기본: 입력 파일명.report.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 퍼지·발음 유사 매치 사용
        #[arg(long)]
        enhanced: bool,

        /// 진행 표시줄 숨기기
        #[arg(long)]
        quiet: bool,
    },

    /// 사전 조회·검증
    Dict {
        /// 태그 조회
        #[arg(long)]
        lookup: Option<String>,

        /// 사전 JSON 파일 검증
        #[arg(long)]
        check: Option<PathBuf>,

        /// 사전 통계 표시
        #[arg(long)]
        stats: bool,
    },

    /// 설정 표시/편집
    Config {
        /// 추가 사전 경로 설정
        #[arg(long)]
        set_dictionary: Option<PathBuf>,

        /// 향미 태그 최대 개수 설정
        #[arg(long)]
        set_max_flavors: Option<usize>,

        /// 퍼지·발음 유사 매치 기본값 설정
        #[arg(long)]
        enhanced: Option<bool>,

        /// 설정 표시
        #[arg(long)]
        show: bool,
    },
}

/// バッチ出力のデフォルトパス
pub fn default_report_path(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tastings");
    input.with_file_name(format!("{}.report.json", stem))
}
