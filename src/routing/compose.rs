//! Reply texts and model instructions.

use super::traits::LanguageTag;

/// Line between the original and the translation.
pub const DELIMITER: &str = "──────────";

/// Prefix of every assistant answer.
pub const AI_MARKER: &str = "🤖 看護助理 AI";

/// Between [`AI_MARKER`] and the answer.
pub const AI_SEPARATOR: &str = "\n";

/// Sent when a trigger keyword arrives without a question.
pub const HELP_TEXT: &str = "🤖 看護助理 AI 使用說明\n\
在訊息開頭輸入「看護助理」，後面接著您的問題，例如：\n\
看護助理 長輩晚上睡不好怎麼辦？\n\
\n\
🤖 Petunjuk Asisten Perawat AI\n\
Ketik \"asisten perawat\" di awal pesan, lalu pertanyaan Anda, contoh:\n\
asisten perawat bagaimana cara membantu lansia mandi?";

/// Sent when the assistant could not answer.
pub const APOLOGY_TEXT: &str = "🤖 抱歉，看護助理 AI 暫時無法回答，請稍後再試。\n\
🤖 Maaf, Asisten Perawat AI sedang tidak dapat menjawab. Silakan coba lagi nanti.";

const ASSISTANT_PROMPT_ZH: &str = "你是一位溫柔、專業的「看護助理」，協助台灣家庭照顧長輩，\
並幫助家屬與印尼籍看護溝通。回答請使用繁體中文，內容簡潔、具體、可立即執行；\
涉及醫療判斷時，提醒使用者諮詢醫師或護理師。";

const ASSISTANT_PROMPT_ID: &str = "Anda adalah \"Asisten Perawat\" yang ramah dan profesional. \
Anda membantu perawat asal Indonesia yang bekerja di Taiwan merawat lansia dan berkomunikasi \
dengan keluarga majikan. Jawablah dalam Bahasa Indonesia yang sederhana, singkat, dan praktis. \
Untuk pertanyaan medis, sarankan untuk berkonsultasi dengan dokter atau perawat.";

/// Display label for a language block.
pub fn label(tag: &LanguageTag) -> String {
    match tag {
        LanguageTag::ZhTw => "🇹🇼 中文".to_string(),
        LanguageTag::ZhCn => "🇨🇳 中文".to_string(),
        LanguageTag::Id => "🇮🇩 Bahasa Indonesia".to_string(),
        LanguageTag::En => "🇺🇸 English".to_string(),
        LanguageTag::Other(code) => format!("🌐 {code}"),
    }
}

/// Two-block translation reply: original first, translation second.
pub fn compose_translation(
    source: &LanguageTag,
    original: &str,
    target: &LanguageTag,
    translated: &str,
) -> String {
    format!(
        "{}:\n{original}\n{DELIMITER}\n{}:\n{translated}",
        label(source),
        label(target)
    )
}

pub fn compose_assistant(answer: &str) -> String {
    format!("{AI_MARKER}: {AI_SEPARATOR}{}", answer.trim())
}

/// Persona for the assistant, in the language the question was asked in.
pub fn assistant_system_prompt(question_language: &LanguageTag) -> &'static str {
    match question_language {
        LanguageTag::Id => ASSISTANT_PROMPT_ID,
        _ => ASSISTANT_PROMPT_ZH,
    }
}

pub fn translation_system_prompt(source: &LanguageTag, target: &LanguageTag) -> String {
    format!(
        "You are a professional translator helping a Taiwanese family talk with their \
Indonesian live-in caregiver. Translate the user's message from {} into {}. \
Keep the tone natural and polite, keep names, numbers and medicine names unchanged, \
and reply with the translation only, without notes or quotation marks.",
        source.english_name(),
        target.english_name()
    )
}
