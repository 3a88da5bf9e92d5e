//! Customer outreach message text.
//!
//! Delivery is someone else's job; this only renders the plain-text body
//! for one customer's delayed meters on one platform.

use super::ExportRow;

/// Build the outreach message for a group of delayed rows belonging to a
/// single customer and platform. Rows with an unparseable last-reading
/// date still render, with a placeholder.
pub fn outreach_message(rows: &[ExportRow]) -> String {
    let mut lista_medidores = String::new();
    for row in rows {
        let data = if row.data_ultima_leitura.trim().is_empty() {
            "data não informada"
        } else {
            row.data_ultima_leitura.trim()
        };
        lista_medidores.push_str(&format!(
            "    • {} desde {}\n",
            row.descricao_sensor, data
        ));
    }

    let mensagem_de_quantidade = if rows.len() > 1 {
        "Identificamos que os medidores a seguir não estão enviando dados de consumo."
    } else {
        "Identificamos que o medidor a seguir não está enviando dados de consumo."
    };

    format!(
        "\nOlá, tudo bem?\n\n{mensagem_de_quantidade}\n\n{lista_medidores}\n\
Gostaríamos de verificar junto a você se houve alguma intervenção recente no local \
(como manutenção elétrica, desligamento de equipamentos ou troca de rede).\n\
Caso não tenha ocorrido nenhuma alteração, nossa equipe pode auxiliar na verificação \
e restabelecimento da comunicação do equipamento.\n\
Por gentileza, confirme se podemos seguir com o suporte ou, se preferir, nos informe \
um horário conveniente para realizarmos o contato técnico.\n\n\
Ficamos à disposição para ajudar.\n\nAtenciosamente.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(descricao: &str, data: &str) -> ExportRow {
        ExportRow {
            data_atual: "10/03/2025".into(),
            nome_descricao: format!("Ana{descricao}"),
            nome: "Ana".into(),
            email: "ana@example.com".into(),
            descricao_sensor: descricao.into(),
            data_ultima_leitura: data.into(),
            plataforma: "Lyum".into(),
            dias_off: 3,
        }
    }

    #[test]
    fn single_meter_uses_singular_wording() {
        let message = outreach_message(&[row("M-001", "07/03/2025")]);
        assert!(message.contains("o medidor a seguir não está"));
        assert!(message.contains("    • M-001 desde 07/03/2025"));
    }

    #[test]
    fn multiple_meters_use_plural_wording() {
        let message = outreach_message(&[row("M-001", "07/03/2025"), row("M-002", "01/03/2025")]);
        assert!(message.contains("os medidores a seguir não estão"));
        assert!(message.contains("• M-001 desde 07/03/2025"));
        assert!(message.contains("• M-002 desde 01/03/2025"));
    }

    #[test]
    fn missing_date_gets_placeholder() {
        let message = outreach_message(&[row("M-001", "  ")]);
        assert!(message.contains("• M-001 desde data não informada"));
    }
}
