//! Seed data for the cultural knowledge base

use super::{
    ExpectedFeatures, FeatureRange, HistoricalPeriod, PhilosophicalConcept, PhraseEntry, StyleInfo,
    TermEntry,
};
use crate::types::{Alignment, InkFlow, Language, MultiLanguageText};

fn names(korean: &str, english: &str, japanese: &str, chinese: &str) -> MultiLanguageText {
    let mut text = MultiLanguageText::new();
    text.set(Language::Korean, korean);
    text.set(Language::English, english);
    text.set(Language::Japanese, japanese);
    text.set(Language::Chinese, chinese);
    text
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(super) fn styles() -> Vec<StyleInfo> {
    vec![
        StyleInfo {
            id: "kaishu".into(),
            name: names("해서", "Regular Script", "楷書", "楷书"),
            description: "Standard script with clearly separated, carefully formed strokes".into(),
            characteristics: strings(&[
                "Each stroke written separately",
                "Balanced square character forms",
                "Even spacing on an implied grid",
            ]),
            expected_features: ExpectedFeatures {
                stroke_thickness: FeatureRange::new(0.45, 0.65),
                ink_density: FeatureRange::new(0.70, 0.90),
                spacing: FeatureRange::new(0.40, 0.60),
                alignment: Alignment::Grid,
                ink_flow: InkFlow::Deliberate,
                pressure_variation: FeatureRange::new(0.20, 0.40),
            },
            historical_periods: strings(&["tang", "joseon", "goryeo"]),
            notable_artists: strings(&["Ouyang Xun", "Yan Zhenqing", "Han Ho"]),
            related_concepts: strings(&["mind-cultivation", "harmony"]),
        },
        StyleInfo {
            id: "xingshu".into(),
            name: names("행서", "Running Script", "行書", "行书"),
            description: "Semi-cursive script where strokes connect while characters stay legible"
                .into(),
            characteristics: strings(&[
                "Connected strokes within characters",
                "Moderate writing speed",
                "Vertical columns with natural rhythm",
            ]),
            expected_features: ExpectedFeatures {
                stroke_thickness: FeatureRange::new(0.35, 0.55),
                ink_density: FeatureRange::new(0.55, 0.75),
                spacing: FeatureRange::new(0.30, 0.50),
                alignment: Alignment::Columnar,
                ink_flow: InkFlow::Steady,
                pressure_variation: FeatureRange::new(0.40, 0.60),
            },
            historical_periods: strings(&["tang", "song", "joseon"]),
            notable_artists: strings(&["Wang Xizhi", "Su Shi", "Kim Jeong-hui"]),
            related_concepts: strings(&["qi", "harmony"]),
        },
        StyleInfo {
            id: "caoshu".into(),
            name: names("초서", "Cursive Script", "草書", "草书"),
            description: "Highly abbreviated script written in continuous rapid movements".into(),
            characteristics: strings(&[
                "Strokes abbreviated and merged",
                "Rapid continuous brush movement",
                "Strong variation of pressure",
            ]),
            expected_features: ExpectedFeatures {
                stroke_thickness: FeatureRange::new(0.20, 0.45),
                ink_density: FeatureRange::new(0.40, 0.65),
                spacing: FeatureRange::new(0.15, 0.35),
                alignment: Alignment::Flowing,
                ink_flow: InkFlow::Rapid,
                pressure_variation: FeatureRange::new(0.60, 0.90),
            },
            historical_periods: strings(&["tang", "ming"]),
            notable_artists: strings(&["Zhang Xu", "Huaisu"]),
            related_concepts: strings(&["qi", "yin-yang"]),
        },
        StyleInfo {
            id: "lishu".into(),
            name: names("예서", "Clerical Script", "隷書", "隶书"),
            description: "Flattened script with wave-like horizontal strokes".into(),
            characteristics: strings(&[
                "Wide flattened characters",
                "Silkworm-head and wild-goose-tail strokes",
                "Heavy even ink",
            ]),
            expected_features: ExpectedFeatures {
                stroke_thickness: FeatureRange::new(0.55, 0.80),
                ink_density: FeatureRange::new(0.75, 0.95),
                spacing: FeatureRange::new(0.50, 0.70),
                alignment: Alignment::Grid,
                ink_flow: InkFlow::Steady,
                pressure_variation: FeatureRange::new(0.30, 0.50),
            },
            historical_periods: strings(&["joseon"]),
            notable_artists: strings(&["Kim Jeong-hui"]),
            related_concepts: strings(&["heaven-earth-human"]),
        },
        StyleInfo {
            id: "zhuanshu".into(),
            name: names("전서", "Seal Script", "篆書", "篆书"),
            description: "Ancient script of uniform line width used for seals and inscriptions"
                .into(),
            characteristics: strings(&[
                "Uniform line thickness",
                "Symmetric elongated forms",
                "Minimal pressure variation",
            ]),
            expected_features: ExpectedFeatures {
                stroke_thickness: FeatureRange::new(0.40, 0.60),
                ink_density: FeatureRange::new(0.80, 1.00),
                spacing: FeatureRange::new(0.55, 0.75),
                alignment: Alignment::Grid,
                ink_flow: InkFlow::Deliberate,
                pressure_variation: FeatureRange::new(0.05, 0.20),
            },
            historical_periods: strings(&["joseon", "ming"]),
            notable_artists: strings(&["Li Si", "Heo Mok"]),
            related_concepts: strings(&["heaven-earth-human", "fortune"]),
        },
        StyleInfo {
            id: "hangeul-gungche".into(),
            name: names("궁체", "Hangeul Palace Style", "宮体", "宫体"),
            description: "Elegant Hangeul script developed by court ladies of the Joseon palace"
                .into(),
            characteristics: strings(&[
                "Straight right-aligned vertical axis",
                "Refined tapered strokes",
                "Orderly vertical columns",
            ]),
            expected_features: ExpectedFeatures {
                stroke_thickness: FeatureRange::new(0.30, 0.50),
                ink_density: FeatureRange::new(0.60, 0.80),
                spacing: FeatureRange::new(0.45, 0.65),
                alignment: Alignment::Columnar,
                ink_flow: InkFlow::Steady,
                pressure_variation: FeatureRange::new(0.25, 0.45),
            },
            historical_periods: strings(&["joseon", "modern"]),
            notable_artists: strings(&["Lee Mi-kyung"]),
            related_concepts: strings(&["jeong", "mind-cultivation"]),
        },
        StyleInfo {
            id: "hangeul-minche".into(),
            name: names("민체", "Hangeul Folk Style", "民体", "民体"),
            description: "Free Hangeul script of common people, personal and unconstrained".into(),
            characteristics: strings(&[
                "Irregular character sizes",
                "Spontaneous personal expression",
                "Loose free layout",
            ]),
            expected_features: ExpectedFeatures {
                stroke_thickness: FeatureRange::new(0.40, 0.70),
                ink_density: FeatureRange::new(0.50, 0.80),
                spacing: FeatureRange::new(0.25, 0.55),
                alignment: Alignment::Free,
                ink_flow: InkFlow::Continuous,
                pressure_variation: FeatureRange::new(0.45, 0.75),
            },
            historical_periods: strings(&["joseon", "modern"]),
            notable_artists: strings(&[]),
            related_concepts: strings(&["jeong", "han"]),
        },
        StyleInfo {
            id: "mixed-script".into(),
            name: names("혼합체", "Mixed Script", "混合書体", "混合书体"),
            description: "Composition combining Hanja and Hangeul or several script styles".into(),
            characteristics: strings(&["Mixed script composition", "Varied stroke vocabulary"]),
            expected_features: ExpectedFeatures {
                stroke_thickness: FeatureRange::new(0.30, 0.70),
                ink_density: FeatureRange::new(0.50, 0.85),
                spacing: FeatureRange::new(0.30, 0.60),
                alignment: Alignment::Free,
                ink_flow: InkFlow::Steady,
                pressure_variation: FeatureRange::new(0.30, 0.60),
            },
            historical_periods: strings(&["modern"]),
            notable_artists: strings(&[]),
            related_concepts: strings(&["harmony"]),
        },
    ]
}

pub(super) fn concepts() -> Vec<PhilosophicalConcept> {
    vec![
        PhilosophicalConcept {
            id: "yin-yang".into(),
            name: names("음양", "Yin and Yang", "陰陽", "阴阳"),
            description: "Complementary opposing forces whose balance brings order".into(),
            origin: "Chinese cosmology".into(),
            keywords: strings(&["陰陽", "阴阳", "음양", "yin-yang"]),
            related_concepts: strings(&["qi", "harmony"]),
        },
        PhilosophicalConcept {
            id: "qi".into(),
            name: names("기", "Qi (Vital Energy)", "気", "气"),
            description: "Life force that animates the brush stroke and the writer".into(),
            origin: "Daoist and Confucian thought".into(),
            keywords: strings(&["氣", "気", "气", "기운", "qi"]),
            related_concepts: strings(&["yin-yang"]),
        },
        PhilosophicalConcept {
            id: "harmony".into(),
            name: names("조화", "Harmony", "調和", "和谐"),
            description: "Balanced accord between people, nature and the cosmos".into(),
            origin: "Confucian thought".into(),
            keywords: strings(&["和", "조화", "harmony"]),
            related_concepts: strings(&["yin-yang", "fortune"]),
        },
        PhilosophicalConcept {
            id: "jeong".into(),
            name: names("정", "Jeong", "情(ジョン)", "情"),
            description: "Korean sense of deep lasting affection and attachment between people"
                .into(),
            origin: "Korean folk culture".into(),
            keywords: strings(&["情", "정", "jeong"]),
            related_concepts: strings(&["han"]),
        },
        PhilosophicalConcept {
            id: "han".into(),
            name: names("한", "Han", "恨(ハン)", "恨"),
            description: "Korean sense of collective sorrow, longing and resilience".into(),
            origin: "Korean folk culture".into(),
            keywords: strings(&["恨", "han"]),
            related_concepts: strings(&["jeong"]),
        },
        PhilosophicalConcept {
            id: "heaven-earth-human".into(),
            name: names("천지인", "Heaven, Earth and Humanity", "天地人", "天地人"),
            description: "The three powers whose unity underlies the design of Hangeul vowels"
                .into(),
            origin: "Neo-Confucian cosmology".into(),
            keywords: strings(&["天地人", "천지인"]),
            related_concepts: strings(&["harmony", "yin-yang"]),
        },
        PhilosophicalConcept {
            id: "mind-cultivation".into(),
            name: names("수신", "Self-Cultivation", "修身", "修身"),
            description: "Moral refinement of the self, visible in an upright brush".into(),
            origin: "Confucian thought".into(),
            keywords: strings(&["修身", "心正", "수신", "寧靜"]),
            related_concepts: strings(&["qi"]),
        },
        PhilosophicalConcept {
            id: "fortune".into(),
            name: names("길상", "Auspiciousness", "吉祥", "吉祥"),
            description: "Wishes for blessing, longevity and good fortune".into(),
            origin: "East Asian folk belief".into(),
            keywords: strings(&["祥", "福", "壽", "길상"]),
            related_concepts: strings(&["harmony"]),
        },
    ]
}

pub(super) fn periods() -> Vec<HistoricalPeriod> {
    vec![
        HistoricalPeriod {
            id: "joseon".into(),
            name: names("조선", "Joseon Dynasty", "朝鮮", "朝鲜"),
            start_year: 1392,
            end_year: Some(1897),
            description: "Neo-Confucian dynasty that created Hangeul and scholarly calligraphy"
                .into(),
            characteristics: strings(&[
                "Invention of Hangeul (1443)",
                "Scholar-official calligraphy culture",
                "Emergence of the Chusa style",
            ]),
            notable_artists: strings(&["Han Ho", "Kim Jeong-hui", "Yi Kwang-sa"]),
            dominant_styles: strings(&["kaishu", "xingshu", "hangeul-gungche"]),
            related_concepts: strings(&["mind-cultivation", "heaven-earth-human"]),
        },
        HistoricalPeriod {
            id: "goryeo".into(),
            name: names("고려", "Goryeo Dynasty", "高麗", "高丽"),
            start_year: 918,
            end_year: Some(1392),
            description: "Buddhist dynasty known for sutra transcription and Tripitaka Koreana"
                .into(),
            characteristics: strings(&["Sutra transcription", "Influence of Song calligraphy"]),
            notable_artists: strings(&["Tanyeon"]),
            dominant_styles: strings(&["kaishu"]),
            related_concepts: strings(&["mind-cultivation"]),
        },
        HistoricalPeriod {
            id: "modern".into(),
            name: names("근현대", "Modern Era", "近現代", "近现代"),
            start_year: 1897,
            end_year: None,
            description: "Revival and reinterpretation of calligraphy as contemporary art".into(),
            characteristics: strings(&[
                "Hangeul calligraphy movement",
                "Abstract calligraphic art",
            ]),
            notable_artists: strings(&["Kim Chung-hyun", "Son Jae-hyeong"]),
            dominant_styles: strings(&["hangeul-gungche", "hangeul-minche", "mixed-script"]),
            related_concepts: strings(&["jeong", "han"]),
        },
        HistoricalPeriod {
            id: "tang".into(),
            name: names("당", "Tang Dynasty", "唐", "唐"),
            start_year: 618,
            end_year: Some(907),
            description: "Golden age that codified regular script and produced cursive masters"
                .into(),
            characteristics: strings(&["Standardized regular script", "Wild cursive script"]),
            notable_artists: strings(&["Ouyang Xun", "Yan Zhenqing", "Zhang Xu"]),
            dominant_styles: strings(&["kaishu", "caoshu"]),
            related_concepts: strings(&["qi"]),
        },
        HistoricalPeriod {
            id: "song".into(),
            name: names("송", "Song Dynasty", "宋", "宋"),
            start_year: 960,
            end_year: Some(1279),
            description: "Era valuing personal expression over classical rules".into(),
            characteristics: strings(&["Expressive running script", "Scholar-artist ideal"]),
            notable_artists: strings(&["Su Shi", "Mi Fu", "Huang Tingjian"]),
            dominant_styles: strings(&["xingshu"]),
            related_concepts: strings(&["qi", "mind-cultivation"]),
        },
        HistoricalPeriod {
            id: "ming".into(),
            name: names("명", "Ming Dynasty", "明", "明"),
            start_year: 1368,
            end_year: Some(1644),
            description: "Period of large hanging scrolls and bold cursive works".into(),
            characteristics: strings(&["Large-format scrolls", "Revival of seal script study"]),
            notable_artists: strings(&["Wen Zhengming", "Dong Qichang"]),
            dominant_styles: strings(&["caoshu", "xingshu"]),
            related_concepts: strings(&["yin-yang"]),
        },
    ]
}

pub(super) fn terms() -> Vec<TermEntry> {
    let term = |korean: &str, english: &str, japanese: &str, chinese: &str| TermEntry {
        korean: korean.into(),
        english: english.into(),
        japanese: japanese.into(),
        chinese: chinese.into(),
        whole_word: korean.chars().count() == 1,
    };

    vec![
        term("서예", "calligraphy", "書道", "书法"),
        term("붓", "brush", "筆", "毛笔"),
        term("먹", "ink stick", "墨", "墨"),
        term("벼루", "inkstone", "硯", "砚"),
        term("한지", "hanji (Korean mulberry paper)", "韓紙", "韩纸"),
        term("획", "stroke", "画", "笔画"),
        term("여백", "yeobaek (empty space)", "余白", "留白"),
        term("낙관", "nakgwan (artist's seal)", "落款", "落款"),
        term("해서", "regular script", "楷書", "楷书"),
        term("행서", "running script", "行書", "行书"),
        term("초서", "cursive script", "草書", "草书"),
        term("예서", "clerical script", "隷書", "隶书"),
        term("전서", "seal script", "篆書", "篆书"),
        term("궁체", "palace style", "宮体", "宫体"),
        term("기운", "qi (vital energy)", "気韻", "气韵"),
        term("조화", "harmony", "調和", "和谐"),
        term("정", "jeong", "情(ジョン)", "情"),
        term("한", "han", "恨(ハン)", "恨"),
    ]
}

pub(super) fn phrases() -> Vec<PhraseEntry> {
    let phrase = |text: &str, reading: &str, meaning: &str| PhraseEntry {
        text: text.into(),
        reading: reading.into(),
        meaning: meaning.into(),
    };

    vec![
        phrase("和氣致祥", "화기치상", "Harmony brings auspiciousness"),
        phrase("心正筆正", "심정필정", "When the mind is upright, the brush is upright"),
        phrase("寧靜致遠", "영정치원", "Through tranquility one reaches far"),
        phrase("天地人", "천지인", "Heaven, earth and humanity"),
        phrase("一期一會", "일기일회", "One time, one meeting"),
        phrase("自强不息", "자강불식", "Strive ceaselessly for self-improvement"),
        phrase("마음의 평화", "마음의 평화", "Peace of mind"),
        phrase("정 깊은 사람", "정 깊은 사람", "A person of deep affection"),
    ]
}
