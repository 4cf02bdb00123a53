/// English identifier words and the Portuguese words they get renamed to
/// when a codebase is localized.
pub const TRANSLATIONS_EN_PT: &[(&str, &str)] = &[
    ("name", "nome"),
    ("phone", "telefone"),
    ("msg", "mensagem"),
    ("message", "mensagem"),
    ("address", "endereco"),
    ("user", "usuario"),
    ("username", "usuario"),
    ("password", "senha"),
    ("login", "entrar"),
    ("logout", "sair"),
    ("register", "registrar"),
    ("signup", "cadastrar"),
    ("signin", "entrar"),
    ("search", "buscar"),
    ("find", "buscar"),
    ("save", "salvar"),
    ("submit", "enviar"),
    ("send", "enviar"),
    ("edit", "editar"),
    ("update", "atualizar"),
    ("delete", "deletar"),
    ("remove", "remover"),
    ("cancel", "cancelar"),
    ("confirm", "confirmar"),
    ("yes", "sim"),
    ("no", "nao"),
    ("next", "proximo"),
    ("previous", "anterior"),
    ("back", "voltar"),
    ("continue", "continuar"),
    ("finish", "finalizar"),
    ("success", "sucesso"),
    ("error", "erro"),
    ("fail", "falha"),
    ("warning", "aviso"),
    ("info", "informacao"),
    ("description", "descricao"),
    ("title", "titulo"),
    ("header", "cabecalho"),
    ("footer", "rodape"),
    ("content", "conteudo"),
    ("table", "tabela"),
    ("row", "linha"),
    ("column", "coluna"),
    ("cell", "celula"),
    ("list", "lista"),
    ("details", "detalhes"),
    ("home", "inicio"),
    ("main", "principal"),
    ("dashboard", "painel"),
    ("profile", "perfil"),
    ("settings", "configuracoes"),
    ("preferences", "preferencias"),
    ("options", "opcoes"),
    ("help", "ajuda"),
    ("support", "suporte"),
    ("contact", "contato"),
    ("about", "sobre"),
    ("form", "formulario"),
    ("field", "campo"),
    ("value", "valor"),
    ("amount", "quantidade"),
    ("price", "preco"),
    ("active", "ativo"),
    ("inactive", "inativo"),
    ("blocked", "bloqueado"),
    ("pending", "pendente"),
    ("completed", "completo"),
    ("date", "data"),
    ("time", "hora"),
    ("day", "dia"),
    ("month", "mes"),
    ("year", "ano"),
    ("download", "baixar"),
    ("file", "arquivo"),
    ("image", "imagem"),
    ("photo", "foto"),
    ("picture", "imagem"),
    ("page", "pagina"),
    ("view", "visualizar"),
    ("print", "imprimir"),
    ("map", "mapa"),
    ("city", "cidade"),
    ("state", "estado"),
    ("country", "pais"),
    ("zip", "cep"),
    ("code", "codigo"),
    ("number", "numero"),
];

/// Words that identify what a UI element is for, in either language.
pub const DOMAIN_KEYWORDS: &[&str] = &[
    "nome", "email", "telefone", "msg", "mensagem", "erro", "error", "sucesso", "success",
    "contato", "senha", "password", "login", "user", "submit", "send", "search", "tabela",
    "table", "pagina", "home", "form", "campo", "data", "hora", "preco", "status", "usuario",
];

/// Layout and utility class names that never identify an element.
pub const GENERIC_CLASS_WORDS: &[&str] = &["container", "row", "col", "main", "section"];

/// Class tokens skipped entirely when collecting class candidates.
pub const IGNORED_CLASS_TOKENS: &[&str] = &[
    "d-none",
    "hidden",
    "container",
    "row",
    "col",
    "col-md-12",
    "main",
    "section",
];

/// Logical-name fragments that mark a clickable element.
pub const BUTTON_HINTS: &[&str] = &["btn", "button", "submit", "enviar"];
pub const BUTTON_TAGS: &[&str] = &["button", "input"];

/// Logical-name fragments that mark a data-entry element.
pub const FIELD_HINTS: &[&str] = &["input", "campo", "field", "form"];
pub const FIELD_TAGS: &[&str] = &["input", "textarea", "select"];

pub fn translate(word: &str) -> Option<&'static str> {
    TRANSLATIONS_EN_PT
        .iter()
        .find(|(en, _)| *en == word)
        .map(|(_, pt)| *pt)
}

pub fn is_ignored_class_token(token: &str) -> bool {
    IGNORED_CLASS_TOKENS.contains(&token.to_lowercase().as_str())
}
