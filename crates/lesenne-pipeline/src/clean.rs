/// Response normalization applied to every generated answer.
///
/// Strips a leading echo of the user's question (case-insensitive) and any
/// boilerplate lead-in lines ("votre question est...", "vous demandez...").
/// Purely textual: content after the stripped prefix is never altered.
/// Runs to a fixpoint, so a second pass finds nothing left to strip.
pub fn clean_response(response: &str, question: &str) -> String {
    let mut current = response.trim().to_string();

    loop {
        let next = clean_once(&current, question);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn clean_once(text: &str, question: &str) -> String {
    let mut cleaned = text.trim();

    if let Some(rest) = strip_prefix_ignore_case(cleaned, question.trim()) {
        cleaned = rest.trim_start();
    }

    loop {
        let (first_line, rest) = match cleaned.split_once('\n') {
            Some((line, rest)) => (line, rest),
            None => (cleaned, ""),
        };

        if !first_line.is_empty() && is_boilerplate_lead_in(first_line) {
            cleaned = rest.trim_start();
        } else {
            break;
        }

        if cleaned.is_empty() {
            break;
        }
    }

    cleaned.trim().to_string()
}

/// Lead-in patterns carried over from the assistant's known bad habits:
/// restating the question or announcing what the user asked.
fn is_boilerplate_lead_in(line: &str) -> bool {
    let line = line.to_lowercase();

    (line.contains("question") && line.contains(':'))
        || (line.contains("demande") && line.contains(':'))
        || line.contains("vous demandez")
        || line.contains("concernant votre question")
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }

    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        match chars.next() {
            Some((_, actual)) if actual == expected => {}
            // Accented characters fold too, not just ASCII
            Some((_, actual)) if actual.to_lowercase().eq(expected.to_lowercase()) => {}
            _ => return None,
        }
    }

    let end = chars.next().map(|(i, _)| i).unwrap_or(text.len());
    Some(&text[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_question_echo() {
        let answer = "Qu'est-ce que l'émotivité ?\nL'émotivité est une disposition du caractère.";
        let cleaned = clean_response(answer, "Qu'est-ce que l'émotivité ?");
        assert_eq!(cleaned, "L'émotivité est une disposition du caractère.");
    }

    #[test]
    fn echo_strip_is_case_insensitive() {
        let answer = "QU'EST-CE QUE L'ACTIVITÉ ?\nL'activité désigne la tendance à agir.";
        let cleaned = clean_response(answer, "Qu'est-ce que l'activité ?");
        assert!(cleaned.starts_with("L'activité"));
    }

    #[test]
    fn strips_boilerplate_lead_in_lines() {
        let answer = "Votre question : l'émotivité\nVous demandez une définition\nC'est une disposition affective.";
        let cleaned = clean_response(answer, "quelque chose d'autre");
        assert_eq!(cleaned, "C'est une disposition affective.");
    }

    #[test]
    fn untouched_when_nothing_matches() {
        let answer = "L'émotivité est l'une des trois dispositions fondamentales.";
        assert_eq!(clean_response(answer, "Qu'est-ce que l'émotivité ?"), answer);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let cases = [
            ("Qu'est-ce que l'émotivité ?\nUne disposition.", "Qu'est-ce que l'émotivité ?"),
            ("Votre question : test\nRéponse réelle.", "test"),
            ("Réponse sans préfixe.", "autre question"),
            ("", "question"),
        ];

        for (answer, question) in cases {
            let once = clean_response(answer, question);
            let twice = clean_response(&once, question);
            assert_eq!(once, twice, "clean not idempotent for {:?}", answer);
        }
    }

    #[test]
    fn content_after_prefix_is_preserved_verbatim() {
        let body = "Le nerveux est émotif, inactif, primaire.\n\nIl réagit vivement.";
        let answer = format!("Votre question : le nerveux\n{}", body);
        assert_eq!(clean_response(&answer, "Décris le type nerveux"), body);
    }
}
