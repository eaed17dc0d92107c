//! Bundled translations of phase names and widget labels.

/// English names of the eight phases, in cycle order.
pub const PHASE_NAMES: [&str; 8] = [
    "New Moon",
    "Waxing Crescent",
    "First Quarter",
    "Waxing Gibbous",
    "Full Moon",
    "Waning Gibbous",
    "Last Quarter",
    "Waning Crescent",
];

/// Widget labels of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub illumination: &'static str,
    pub age: &'static str,
    pub days: &'static str,
    pub r#in: &'static str,
}

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Fr,
    Es,
    De,
    It,
    Pt,
    Ru,
    Zh,
    Ja,
    Ko,
    Ar,
    Hi,
    Tr,
    Nl,
    Pl,
}

impl Locale {
    pub const ALL: [Locale; 15] = [
        Locale::En,
        Locale::Fr,
        Locale::Es,
        Locale::De,
        Locale::It,
        Locale::Pt,
        Locale::Ru,
        Locale::Zh,
        Locale::Ja,
        Locale::Ko,
        Locale::Ar,
        Locale::Hi,
        Locale::Tr,
        Locale::Nl,
        Locale::Pl,
    ];

    /// Locale for a POSIX or BCP 47 tag such as `fr_FR.UTF-8` or `pt-BR`.
    ///
    /// Only the language part is used. Unknown languages map to English.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|l| l.code() == language)
            .unwrap_or_default()
    }

    /// Two-letter language code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::Es => "es",
            Locale::De => "de",
            Locale::It => "it",
            Locale::Pt => "pt",
            Locale::Ru => "ru",
            Locale::Zh => "zh",
            Locale::Ja => "ja",
            Locale::Ko => "ko",
            Locale::Ar => "ar",
            Locale::Hi => "hi",
            Locale::Tr => "tr",
            Locale::Nl => "nl",
            Locale::Pl => "pl",
        }
    }

    /// Localized phase names, in the order of [`PHASE_NAMES`].
    pub fn phase_names(&self) -> [&'static str; 8] {
        match self {
            Locale::En => PHASE_NAMES,
            Locale::Fr => [
                "Nouvelle Lune",
                "Premier Croissant",
                "Premier Quartier",
                "Gibbeuse Croissante",
                "Pleine Lune",
                "Gibbeuse Décroissante",
                "Dernier Quartier",
                "Dernier Croissant",
            ],
            Locale::Es => [
                "Luna Nueva",
                "Luna Creciente",
                "Cuarto Creciente",
                "Gibosa Creciente",
                "Luna Llena",
                "Gibosa Menguante",
                "Cuarto Menguante",
                "Luna Menguante",
            ],
            Locale::De => [
                "Neumond",
                "Zunehmende Sichel",
                "Erstes Viertel",
                "Zunehmender Mond",
                "Vollmond",
                "Abnehmender Mond",
                "Letztes Viertel",
                "Abnehmende Sichel",
            ],
            Locale::It => [
                "Luna Nuova",
                "Luna Crescente",
                "Primo Quarto",
                "Gibbosa Crescente",
                "Luna Piena",
                "Gibbosa Calante",
                "Ultimo Quarto",
                "Luna Calante",
            ],
            Locale::Pt => [
                "Lua Nova",
                "Lua Crescente",
                "Quarto Crescente",
                "Gibosa Crescente",
                "Lua Cheia",
                "Gibosa Minguante",
                "Quarto Minguante",
                "Lua Minguante",
            ],
            Locale::Ru => [
                "Новолуние",
                "Растущий серп",
                "Первая четверть",
                "Растущая луна",
                "Полнолуние",
                "Убывающая луна",
                "Последняя четверть",
                "Убывающий серп",
            ],
            Locale::Zh => [
                "新月",
                "蛾眉月",
                "上弦月",
                "盈凸月",
                "满月",
                "亏凸月",
                "下弦月",
                "残月",
            ],
            Locale::Ja => [
                "新月",
                "三日月",
                "上弦の月",
                "十三夜月",
                "満月",
                "十六夜月",
                "下弦の月",
                "有明の月",
            ],
            Locale::Ko => [
                "신월",
                "초승달",
                "상현달",
                "상현망간달",
                "보름달",
                "하현망간달",
                "하현달",
                "그믐달",
            ],
            Locale::Ar => [
                "محاق",
                "هلال أول",
                "تربيع أول",
                "أحدب أول",
                "بدر",
                "أحدب أخير",
                "تربيع أخير",
                "هلال أخير",
            ],
            Locale::Hi => [
                "अमावस्या",
                "बढ़ता चंद्रमा",
                "पहला चौथाई",
                "बढ़ता गिबस",
                "पूर्णिमा",
                "घटता गिबस",
                "आखिरी चौथाई",
                "घटता चंद्रमा",
            ],
            Locale::Tr => [
                "Yeni Ay",
                "Hilal",
                "İlk Dördün",
                "Şişkin Ay",
                "Dolunay",
                "Son Şişkin Ay",
                "Son Dördün",
                "Eski Ay",
            ],
            Locale::Nl => [
                "Nieuwe Maan",
                "Wassende Maan",
                "Eerste Kwartier",
                "Wassende Maan",
                "Volle Maan",
                "Afnemende Maan",
                "Laatste Kwartier",
                "Afnemende Maan",
            ],
            Locale::Pl => [
                "Nów",
                "Rożek przybywający",
                "Pierwsza kwadra",
                "Księżyc garbaty przybywający",
                "Pełnia",
                "Księżyc garbaty ubywający",
                "Ostatnia kwadra",
                "Rożek ubywający",
            ],
        }
    }

    pub fn labels(&self) -> Labels {
        let (illumination, age, days, r#in) = match self {
            Locale::En => ("Illumination", "Age", "days", "in"),
            Locale::Fr => ("Illumination", "Âge", "jours", "dans"),
            Locale::Es => ("Iluminación", "Edad", "días", "en"),
            Locale::De => ("Beleuchtung", "Alter", "Tage", "in"),
            Locale::It => ("Illuminazione", "Età", "giorni", "in"),
            Locale::Pt => ("Iluminação", "Idade", "dias", "em"),
            Locale::Ru => ("Освещённость", "Возраст", "дней", "через"),
            Locale::Zh => ("照明", "月龄", "天", "在"),
            Locale::Ja => ("照度", "月齢", "日", "で"),
            Locale::Ko => ("조도", "월령", "일", "에서"),
            Locale::Ar => ("الإضاءة", "العمر", "أيام", "في"),
            Locale::Hi => ("रोशनी", "आयु", "दिन", "में"),
            Locale::Tr => ("Aydınlanma", "Yaş", "gün", "içinde"),
            Locale::Nl => ("Verlichting", "Leeftijd", "dagen", "in"),
            Locale::Pl => ("Oświetlenie", "Wiek", "dni", "za"),
        };
        Labels {
            illumination,
            age,
            days,
            r#in,
        }
    }

    /// Localized name of an English phase name.
    ///
    /// Names outside the eight phases are returned unchanged.
    pub fn translate_phase<'a>(&self, english: &'a str) -> &'a str {
        match PHASE_NAMES.iter().position(|n| *n == english) {
            Some(i) => self.phase_names()[i],
            None => english,
        }
    }
}
