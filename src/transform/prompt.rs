//! Instruction templates.

use crate::types::{Intent, Language};

/// Build the instruction for `text` under `intent` in `language`.
pub fn build_prompt(text: &str, intent: Intent, language: Language) -> String {
    match (intent, language) {
        (Intent::Rewrite(style), Language::English) => format!(
            "Rewrite the following text in {} style:\n{}\nReturn only the edited version.",
            style.label(),
            text
        ),
        (Intent::Rewrite(style), Language::Turkish) => format!(
            "Aşağıdaki metni {} tarzında yeniden yaz:\n{}\nSadece düzenlenmiş metni döndür.",
            style.label(),
            text
        ),
        (Intent::GrammarFix, Language::English) => format!(
            "Correct any spelling or grammar mistakes in the following sentence:\n{}\n\
             Return only the corrected sentence. If there are no mistakes, return the sentence unchanged.",
            text
        ),
        (Intent::GrammarFix, Language::Turkish) => format!(
            "Aşağıdaki cümlede yazım veya dil bilgisi hatası varsa düzelt:\n{}\n\
             Sadece düzeltilmiş cümleyi döndür. Eğer hata yoksa cümleyi aynen döndür.",
            text
        ),
    }
}
