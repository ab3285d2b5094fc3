use lesenne_types::{Message, Passage};

/// Rewrite prompt: turn a follow-up question into a standalone one.
pub const CONTEXTUALIZE_TEMPLATE: &str = "\
Étant donné un historique de conversation et la dernière question de \
l'utilisateur qui pourrait faire référence au contexte de l'historique de \
conversation, formulez une question autonome qui peut être comprise sans \
l'historique de conversation. Ne répondez PAS à la question, reformulez-la \
uniquement si nécessaire, sinon retournez-la telle quelle.

Historique de conversation:
{chat_history}

Question: {question}

Question contextualisée:";

/// Grounded answering prompt for the characterology corpus.
pub const QA_TEMPLATE: &str = "\
Tu es un assistant caractérologue expert, à la fois pédagogue et curieux. Ton \
rôle est de faire découvrir la caractérologie — la science des types de \
caractère — de manière précise, vivante et accessible.

Tu réponds aux questions des utilisateurs en t'appuyant rigoureusement sur \
les connaissances fournies par la base documentaire, notamment les travaux de \
René Le Senne et les typologies reconnues (émotivité, activité, \
retentissement). Si une réponse n'est pas disponible dans les sources, tu \
l'indiques honnêtement.

Adapte la longueur de ta réponse à la complexité de la question : réponse \
courte pour une question simple, plus développée pour une demande \
d'explication détaillée.

IMPORTANT - Utilise les informations suivantes dans cet ordre de priorité :

1. HISTORIQUE DE CONVERSATION (priorité absolue pour comprendre les \
références comme \"ça\", \"ils\", \"cette notion\") :
{chat_history}

2. CONTEXTE DOCUMENTAIRE (sources pour informations factuelles) :
{context}

3. QUESTION ACTUELLE :
{input}";

/// Role-labeled rendering of a history window.
pub fn format_history(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "(Aucun historique)".to_string();
    }

    let mut text = String::new();
    for message in messages {
        let role = if message.is_human() {
            "Utilisateur"
        } else {
            "Assistant"
        };
        text.push_str(role);
        text.push_str(": ");
        text.push_str(message.content());
        text.push('\n');
    }
    text
}

/// Concatenate passage texts in retrieval order into one context block.
pub fn format_context(passages: &[Passage]) -> String {
    let mut text = String::new();
    for passage in passages {
        text.push_str(&passage.text);
        text.push_str("\n\n");
    }
    text
}

pub fn build_contextualize_prompt(history: &[Message], question: &str) -> String {
    CONTEXTUALIZE_TEMPLATE
        .replace("{chat_history}", &format_history(history))
        .replace("{question}", question)
}

pub fn build_qa_prompt(history: &[Message], passages: &[Passage], question: &str) -> String {
    QA_TEMPLATE
        .replace("{chat_history}", &format_history(history))
        .replace("{context}", &format_context(passages))
        .replace("{input}", question)
}
